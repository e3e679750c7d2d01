pub mod account;
pub mod health;
pub mod itinerary;
pub mod rating;
pub mod suggestion;
pub mod trip_options;

use actix_web::{error::InternalError, http::StatusCode, web, HttpResponse};
use serde_json::json;

use crate::db::store::StoreError;
use crate::middleware::auth::AuthMiddleware;
use crate::services::gemini::GenerationError;

/// Registers every route. Shared by `main` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(err, error_json(StatusCode::BAD_REQUEST, message)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(err, error_json(StatusCode::BAD_REQUEST, message)).into()
    }))
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/api")
            .wrap(AuthMiddleware)
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(account::signup))
                    .route("/signin", web::post().to(account::signin))
                    .route("/session", web::get().to(account::user_session))
                    .route("/profile", web::put().to(account::update_profile)),
            )
            .route(
                "/trip-options",
                web::get().to(trip_options::get_trip_options),
            )
            .route("/suggestions", web::get().to(suggestion::get_suggestions))
            .service(
                web::scope("/itineraries")
                    .route("", web::post().to(itinerary::save))
                    .route("/generate", web::post().to(itinerary::generate))
                    .route("/export", web::post().to(itinerary::export_posted))
                    .route("/public", web::get().to(itinerary::list_public))
                    .route("/mine", web::get().to(itinerary::list_mine))
                    .route("/{id}", web::get().to(itinerary::get_by_id))
                    .route("/{id}", web::put().to(itinerary::update))
                    .route("/{id}/export", web::get().to(itinerary::export_saved))
                    .route("/{id}/ratings", web::get().to(rating::list))
                    .route("/{id}/ratings", web::put().to(rating::upsert)),
            ),
    );
}

pub(crate) fn error_json(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message.into() }))
}

/// Maps a store failure to a response. Database details are logged, never
/// returned.
pub(crate) fn store_failure(err: StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound(msg) => error_json(StatusCode::NOT_FOUND, msg),
        StoreError::Forbidden(msg) => error_json(StatusCode::FORBIDDEN, msg),
        StoreError::Conflict(msg) => error_json(StatusCode::CONFLICT, msg),
        StoreError::Database(msg) => {
            log::error!("Store failure: {}", msg);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub(crate) fn generation_failure(err: &GenerationError) -> HttpResponse {
    match err {
        GenerationError::InvalidFormat(detail) => {
            log::warn!("Unparseable generation response: {}", detail)
        }
        other => log::warn!("Generation failed: {}", other),
    }
    error_json(StatusCode::BAD_GATEWAY, err.to_string())
}
