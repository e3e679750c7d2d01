use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use serde::Serialize;
use serde_json::json;

use crate::middleware::auth_context::{AuthenticatedUser, MaybeUser};
use crate::models::itinerary::{Itinerary, PersistedItinerary, SaveItineraryRequest};
use crate::models::rating::{RatingSummary, RatingWithAuthor};
use crate::models::trip::TripForm;
use crate::routes::{error_json, generation_failure, store_failure};
use crate::services::export::{self, ExportQuery, ExportedDocument};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ItineraryDetail {
    itinerary: PersistedItinerary,
    ratings: Vec<RatingWithAuthor>,
    summary: RatingSummary,
}

fn not_found() -> HttpResponse {
    error_json(StatusCode::NOT_FOUND, "Itinerary not found")
}

fn download(document: ExportedDocument) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(document.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(document.file_name)],
        })
        .body(document.bytes)
}

fn export_response(itinerary: &Itinerary, query: &ExportQuery) -> HttpResponse {
    match export::render(itinerary, query.format) {
        Ok(document) => download(document),
        Err(err) => {
            log::error!("Export failed for {}: {}", itinerary.destination, err);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to export itinerary")
        }
    }
}

/// Loads an itinerary the caller may see. Private rows of other users look
/// missing.
async fn load_visible(
    state: &AppState,
    id: &str,
    user: &MaybeUser,
) -> Result<PersistedItinerary, HttpResponse> {
    match state.store.get_itinerary(id).await {
        Ok(Some(itinerary)) if itinerary.visible_to(user.user_id()) => Ok(itinerary),
        Ok(_) => Err(not_found()),
        Err(err) => Err(store_failure(err)),
    }
}

/*
    /api/itineraries/generate
*/
pub async fn generate(
    user: MaybeUser,
    state: web::Data<AppState>,
    form: web::Json<TripForm>,
) -> impl Responder {
    let trip = match form.into_inner().validate() {
        Ok(trip) => trip,
        Err(errors) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Invalid trip request",
                "fields": errors.fields,
            }))
        }
    };

    log::info!(
        "Generating {} itinerary for {}",
        trip.duration_label(),
        trip.destination()
    );
    match state
        .generator
        .generate_and_save(&trip, user.user_id(), state.store.as_ref())
        .await
    {
        Ok(generated) => HttpResponse::Ok().json(generated),
        Err(err) => generation_failure(&err),
    }
}

/*
    /api/itineraries/export?format=pdf|docx
*/
pub async fn export_posted(
    query: web::Query<ExportQuery>,
    itinerary: web::Json<Itinerary>,
) -> impl Responder {
    export_response(&itinerary, &query)
}

/*
    /api/itineraries/public
*/
pub async fn list_public(state: web::Data<AppState>) -> impl Responder {
    match state.store.list_public_summaries().await {
        Ok(summaries) => HttpResponse::Ok().json(summaries),
        Err(err) => store_failure(err),
    }
}

/*
    /api/itineraries/mine
*/
pub async fn list_mine(user: AuthenticatedUser, state: web::Data<AppState>) -> impl Responder {
    match state.store.list_user_summaries(&user.user_id).await {
        Ok(summaries) => HttpResponse::Ok().json(summaries),
        Err(err) => store_failure(err),
    }
}

/*
    /api/itineraries (POST)
*/
pub async fn save(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<SaveItineraryRequest>,
) -> impl Responder {
    let input = match input.into_inner().into_new_itinerary() {
        Ok(input) => input,
        Err(message) => return error_json(StatusCode::BAD_REQUEST, message),
    };

    match state.store.insert_itinerary(&user.user_id, input).await {
        Ok(saved) => HttpResponse::Created().json(saved),
        Err(err) => store_failure(err),
    }
}

/*
    /api/itineraries/{id}
*/
pub async fn get_by_id(
    path: web::Path<String>,
    user: MaybeUser,
    state: web::Data<AppState>,
) -> impl Responder {
    let id = path.into_inner();

    let (itinerary, ratings, summary) = futures::join!(
        state.store.get_itinerary(&id),
        state.store.list_ratings(&id),
        state.store.rating_summary(&id),
    );

    let itinerary = match itinerary {
        Ok(Some(itinerary)) if itinerary.visible_to(user.user_id()) => itinerary,
        Ok(_) => return not_found(),
        Err(err) => return store_failure(err),
    };

    match (ratings, summary) {
        (Ok(ratings), Ok(summary)) => HttpResponse::Ok().json(ItineraryDetail {
            itinerary,
            ratings,
            summary,
        }),
        (Err(err), _) | (_, Err(err)) => store_failure(err),
    }
}

/*
    /api/itineraries/{id} (PUT)
*/
pub async fn update(
    path: web::Path<String>,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<SaveItineraryRequest>,
) -> impl Responder {
    let input = match input.into_inner().into_new_itinerary() {
        Ok(input) => input,
        Err(message) => return error_json(StatusCode::BAD_REQUEST, message),
    };

    match state
        .store
        .update_itinerary(&user.user_id, &path.into_inner(), input)
        .await
    {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(err) => store_failure(err),
    }
}

/*
    /api/itineraries/{id}/export?format=pdf|docx
*/
pub async fn export_saved(
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
    user: MaybeUser,
    state: web::Data<AppState>,
) -> impl Responder {
    match load_visible(&state, &path.into_inner(), &user).await {
        Ok(saved) => export_response(&saved.itinerary_data, &query),
        Err(response) => response,
    }
}
