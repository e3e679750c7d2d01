use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Responder};

use crate::middleware::auth_context::MaybeUser;
use crate::models::suggestion::SuggestionQuery;
use crate::routes::error_json;
use crate::state::AppState;

const MAX_CLIENT_ID_CHARS: usize = 64;

/// Debounce key: the signed-in user, else the caller's `client_id`, else the
/// peer address.
fn client_key(req: &HttpRequest, user: &MaybeUser, client_id: Option<&str>) -> String {
    if let Some(user_id) = user.user_id() {
        return format!("user:{}", user_id);
    }

    let client_id = client_id
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.chars().count() <= MAX_CLIENT_ID_CHARS);
    match (client_id, req.peer_addr()) {
        (Some(id), _) => format!("client:{}", id),
        (None, Some(addr)) => format!("peer:{}", addr.ip()),
        (None, None) => "anonymous".to_string(),
    }
}

/*
    /api/suggestions?q=&client_id=
*/
pub async fn get_suggestions(
    req: HttpRequest,
    user: MaybeUser,
    state: web::Data<AppState>,
    query: web::Query<SuggestionQuery>,
) -> impl Responder {
    let key = client_key(&req, &user, query.client_id.as_deref());

    match state.suggestions.suggest(&key, &query.q).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => {
            log::warn!("Suggestion lookup failed: {}", err);
            error_json(StatusCode::BAD_GATEWAY, err.to_string())
        }
    }
}
