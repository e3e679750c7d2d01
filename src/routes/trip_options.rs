use actix_web::{HttpResponse, Responder};

use crate::models::trip::TripOptions;

/*
    /api/trip-options
*/
pub async fn get_trip_options() -> impl Responder {
    HttpResponse::Ok().json(TripOptions::catalog())
}
