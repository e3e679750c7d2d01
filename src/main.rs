use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use trip_planner_api::config::AppConfig;
use trip_planner_api::db::open_store;
use trip_planner_api::middleware::auth::JwtKeys;
use trip_planner_api::routes;
use trip_planner_api::services::gemini::{GeminiClient, TextGenerator};
use trip_planner_api::state::AppState;

fn startup_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        startup_error(e)
    })?;

    let store = open_store(&config.store).await.map_err(|e| {
        log::error!("Failed to open store: {}", e);
        startup_error(e)
    })?;

    let gemini = GeminiClient::new(&config.gemini).map_err(startup_error)?;
    if !gemini.is_configured() {
        log::warn!("GEMINI_API_KEY not set; generation will fail and suggestions degrade");
    }
    let text_generator: Arc<dyn TextGenerator> = Arc::new(gemini);

    let state = web::Data::new(AppState::new(store, text_generator, &config));
    let keys = web::Data::new(JwtKeys::new(&config.jwt_secret));

    log::info!("Starting HTTP server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .expose_headers(vec![actix_web::http::header::CONTENT_DISPOSITION])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(keys.clone())
            .configure(routes::configure)
    })
    .bind((config.host.clone(), config.port))?
    .run()
    .await
}
