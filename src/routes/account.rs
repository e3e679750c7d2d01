use std::sync::OnceLock;

use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use regex::Regex;
use serde::Serialize;

use crate::db::store::{new_id, StoreError};
use crate::middleware::auth::JwtKeys;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::timestamp;
use crate::models::user::{normalize_email, ProfileUpdate, SignIn, SignUp, User, UserSession};
use crate::routes::{error_json, store_failure};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    auth_token: String,
    user: UserSession,
}

fn token_response(keys: &JwtKeys, user: User) -> HttpResponse {
    match keys.issue(&user.email, &user.id) {
        Ok(token) => HttpResponse::Ok().json(TokenResponse {
            auth_token: token,
            user: user.into(),
        }),
        Err(err) => {
            log::error!("Token generation failed: {}", err);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Token generation failed")
        }
    }
}

/*
    /api/auth/signup
*/
pub async fn signup(
    state: web::Data<AppState>,
    keys: web::Data<JwtKeys>,
    input: web::Json<SignUp>,
) -> impl Responder {
    let input = input.into_inner();
    let email = normalize_email(&input.email);

    if !is_valid_email(&email) {
        return error_json(StatusCode::BAD_REQUEST, "Invalid email address");
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return error_json(
            StatusCode::BAD_REQUEST,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }

    let password = match bcrypt::hash(&input.password, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(err) => {
            log::error!("Password hashing failed: {}", err);
            return error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user");
        }
    };

    let now = timestamp::now();
    let user = User {
        id: new_id(),
        email,
        password,
        full_name: input
            .full_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        avatar_url: None,
        created_at: now,
        updated_at: now,
    };

    match state.store.create_user(user).await {
        Ok(user) => {
            log::info!("Created user {}", user.id);
            token_response(&keys, user)
        }
        Err(StoreError::Conflict(_)) => error_json(StatusCode::CONFLICT, "User already exists"),
        Err(err) => store_failure(err),
    }
}

/*
    /api/auth/signin
*/
pub async fn signin(
    state: web::Data<AppState>,
    keys: web::Data<JwtKeys>,
    input: web::Json<SignIn>,
) -> impl Responder {
    let input = input.into_inner();
    let email = normalize_email(&input.email);

    match state.store.find_user_by_email(&email).await {
        Ok(Some(user)) => {
            if bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
                token_response(&keys, user)
            } else {
                error_json(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
        }
        // Unknown emails get the same answer as wrong passwords.
        Ok(None) => error_json(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(err) => store_failure(err),
    }
}

/*
    /api/auth/session
*/
pub async fn user_session(user: AuthenticatedUser, state: web::Data<AppState>) -> impl Responder {
    match state.store.find_user_by_id(&user.user_id).await {
        Ok(Some(user)) => HttpResponse::Ok().json(UserSession::from(user)),
        Ok(None) => error_json(StatusCode::NOT_FOUND, "User not found"),
        Err(err) => store_failure(err),
    }
}

/*
    /api/auth/profile
*/
pub async fn update_profile(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<ProfileUpdate>,
) -> impl Responder {
    let input = input.into_inner();
    let update = ProfileUpdate {
        full_name: input.full_name.map(|name| name.trim().to_string()),
        avatar_url: input.avatar_url.map(|url| url.trim().to_string()),
    };

    match state.store.update_profile(&user.user_id, update).await {
        Ok(user) => HttpResponse::Ok().json(UserSession::from(user)),
        Err(err) => store_failure(err),
    }
}

fn is_valid_email(email: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
            )
            .expect("email pattern is valid")
        })
        .is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("first.last+trips@mail.example.org"));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("not an email"));
        assert!(!is_valid_email(""));
    }
}
