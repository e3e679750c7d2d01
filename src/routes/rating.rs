use actix_web::{http::StatusCode, web, HttpResponse, Responder};

use crate::middleware::auth_context::{AuthenticatedUser, MaybeUser};
use crate::models::rating::RatingSubmission;
use crate::routes::{error_json, store_failure};
use crate::state::AppState;

async fn ensure_visible(
    state: &AppState,
    itinerary_id: &str,
    user_id: Option<&str>,
) -> Result<(), HttpResponse> {
    match state.store.get_itinerary(itinerary_id).await {
        Ok(Some(itinerary)) if itinerary.visible_to(user_id) => Ok(()),
        Ok(_) => Err(error_json(StatusCode::NOT_FOUND, "Itinerary not found")),
        Err(err) => Err(store_failure(err)),
    }
}

/*
    /api/itineraries/{id}/ratings (GET)
*/
pub async fn list(
    path: web::Path<String>,
    user: MaybeUser,
    state: web::Data<AppState>,
) -> impl Responder {
    let itinerary_id = path.into_inner();
    if let Err(response) = ensure_visible(&state, &itinerary_id, user.user_id()).await {
        return response;
    }

    match state.store.list_ratings(&itinerary_id).await {
        Ok(ratings) => HttpResponse::Ok().json(ratings),
        Err(err) => store_failure(err),
    }
}

/*
    /api/itineraries/{id}/ratings (PUT)
*/
pub async fn upsert(
    path: web::Path<String>,
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<RatingSubmission>,
) -> impl Responder {
    let itinerary_id = path.into_inner();
    let submission = match input.into_inner().validate() {
        Ok(submission) => submission,
        Err(message) => return error_json(StatusCode::BAD_REQUEST, message),
    };

    if let Err(response) = ensure_visible(&state, &itinerary_id, Some(&user.user_id)).await {
        return response;
    }

    match state
        .store
        .upsert_rating(&user.user_id, &itinerary_id, submission)
        .await
    {
        Ok(rating) => HttpResponse::Ok().json(rating),
        Err(err) => store_failure(err),
    }
}
