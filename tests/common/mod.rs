#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};

use trip_planner_api::config::{AppConfig, GeminiConfig, StoreBackend, SuggestionFallback};
use trip_planner_api::db::memory::MemoryStore;
use trip_planner_api::middleware::auth::JwtKeys;
use trip_planner_api::routes;
use trip_planner_api::services::gemini::{GenerationError, TextGenerator};
use trip_planner_api::state::AppState;

pub const JWT_SECRET: &str = "test-secret";

/// Stand-in for the Gemini client: returns one fixed reply and counts calls.
pub struct ScriptedGenerator {
    configured: bool,
    reply: Mutex<Result<String, String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            configured: true,
            reply: Mutex::new(Ok(reply.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            configured: true,
            reply: Mutex::new(Err(message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            reply: Mutex::new(Err("no key".to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_reply(&self, reply: &str) {
        *self.reply.lock().unwrap() = Ok(reply.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate_text(&self, _prompt: &str) -> Result<String, GenerationError> {
        if !self.configured {
            return Err(GenerationError::MissingApiKey);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .lock()
            .unwrap()
            .clone()
            .map_err(GenerationError::ApiError)
    }
}

pub fn generated_itinerary_json() -> String {
    json!({
        "overview": "Three days of tiles, trams and pastries.",
        "highlights": ["Alfama at sunset", "Belém pastries"],
        "days": [
            {
                "day": 1,
                "date": "2025-06-01",
                "title": "Old Lisbon",
                "activities": [
                    {
                        "time": "9:00 AM",
                        "title": "Tram 28",
                        "description": "Ride through the old quarters.",
                        "location": "Martim Moniz",
                        "duration": "1 hour",
                        "cost": "$3",
                        "rating": 4.6,
                        "category": "sightseeing"
                    }
                ],
                "estimatedCost": "$90",
                "transportation": "Tram"
            }
        ],
        "tips": ["Wear comfortable shoes"]
    })
    .to_string()
}

pub fn trip_form(destination: &str) -> Value {
    json!({
        "destination": destination,
        "startDate": "2025-06-01",
        "endDate": "2025-06-03",
        "budget": "moderate",
        "travelers": "2",
        "interests": ["Food & Dining", "Culture & History"]
    })
}

pub fn itinerary_body(destination: &str) -> Value {
    json!({
        "destination": destination,
        "duration": "3 days",
        "totalBudget": "$1000-3000",
        "travelers": "2 People",
        "overview": format!("A short break in {}.", destination),
        "highlights": ["Old town"],
        "days": [],
        "tips": ["Book ahead"]
    })
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub generator: Arc<ScriptedGenerator>,
    state: web::Data<AppState>,
    keys: web::Data<JwtKeys>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_generator(
            ScriptedGenerator::replying(&generated_itinerary_json()),
            SuggestionFallback::Static,
        )
    }

    pub fn with_generator(generator: ScriptedGenerator, fallback: SuggestionFallback) -> Self {
        Self::with_debounce(generator, fallback, Duration::ZERO)
    }

    pub fn with_debounce(
        generator: ScriptedGenerator,
        fallback: SuggestionFallback,
        debounce: Duration,
    ) -> Self {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            store: StoreBackend::Memory,
            jwt_secret: JWT_SECRET.to_string(),
            gemini: GeminiConfig::default(),
            suggestion_fallback: fallback,
            suggestion_debounce: debounce,
        };

        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(generator);
        let state = AppState::new(store.clone(), generator.clone(), &config);

        Self {
            store,
            generator,
            state: web::Data::new(state),
            keys: web::Data::new(JwtKeys::new(JWT_SECRET)),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .app_data(self.keys.clone())
            .configure(routes::configure)
    }
}

pub struct Session {
    pub token: String,
    pub user_id: String,
}

impl Session {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

/// Signs a new user up and returns their token.
pub async fn sign_up<S, B>(app: &S, email: &str, full_name: &str) -> Session
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "email": email,
            "password": "password123",
            "full_name": full_name
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "signup failed for {}", email);

    let body: Value = test::read_body_json(resp).await;
    Session {
        token: body["auth_token"].as_str().unwrap().to_string(),
        user_id: body["user"]["id"].as_str().unwrap().to_string(),
    }
}

/// Saves `itinerary_body(destination)` for `session` and returns the new id.
pub async fn save_itinerary<S, B>(
    app: &S,
    session: &Session,
    destination: &str,
    is_public: bool,
) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/itineraries")
        .insert_header(session.bearer())
        .set_json(json!({
            "title": format!("{} weekend", destination),
            "is_public": is_public,
            "luxury_level": "moderate",
            "comfort_level": "comfort",
            "itinerary": itinerary_body(destination)
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    body["id"].as_str().unwrap().to_string()
}

/// Rates an itinerary and returns the response status.
pub async fn rate<S, B>(app: &S, session: &Session, itinerary_id: &str, rating: u8) -> u16
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::put()
        .uri(&format!("/api/itineraries/{}/ratings", itinerary_id))
        .insert_header(session.bearer())
        .set_json(json!({ "rating": rating }))
        .to_request();
    test::call_service(app, req).await.status().as_u16()
}
