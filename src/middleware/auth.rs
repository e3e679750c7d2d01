use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    web, Error, HttpMessage, HttpResponse,
};
use chrono::{Duration, Utc};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // email
    pub exp: usize,
    pub iat: usize,
    pub user_id: String,
}

/// HS256 signing material for session tokens.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, email: &str, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
            user_id: user_id.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iat", "sub", "user_id"]);

        decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

fn unauthorized_response(message: &'static str) -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "error": message }))
}

pub(crate) fn unauthorized(message: &'static str) -> Error {
    InternalError::from_response(message, unauthorized_response(message)).into()
}

/// Decodes a `Bearer` token when one is sent and stores its [`Claims`] in the
/// request extensions. Requests without an `Authorization` header pass through
/// anonymously; handlers that need a user extract
/// [`AuthenticatedUser`](crate::middleware::auth_context::AuthenticatedUser).
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => header,
            None => return self.forward(req),
        };

        let token = match auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
        {
            Some(token) => token.trim().to_string(),
            None => return reject(req, unauthorized_response("Malformed authorization header")),
        };

        let keys = match req.app_data::<web::Data<JwtKeys>>() {
            Some(keys) => keys.clone(),
            None => {
                log::error!("JwtKeys missing from application data");
                return reject(
                    req,
                    HttpResponse::InternalServerError()
                        .json(json!({ "error": "Authentication is not configured" })),
                );
            }
        };

        match keys.verify(&token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                self.forward(req)
            }
            Err(err) => {
                log::debug!("Rejected token: {}", err);
                reject(req, unauthorized_response("Invalid token"))
            }
        }
    }
}

impl<S, B> AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    fn forward(
        &self,
        req: ServiceRequest,
    ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

fn reject<B: 'static>(
    req: ServiceRequest,
    response: HttpResponse,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    Box::pin(ready(Ok(req.into_response(response.map_into_right_body()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_verifies() {
        let keys = JwtKeys::new("test-secret");
        let token = keys.issue("ana@example.com", "user-1").unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "ana@example.com");
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = JwtKeys::new("one").issue("ana@example.com", "user-1").unwrap();
        assert!(JwtKeys::new("two").verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = JwtKeys::new("test-secret");
        let past = (Utc::now() - Duration::hours(48)).timestamp() as usize;
        let claims = Claims {
            sub: "ana@example.com".to_string(),
            iat: past,
            exp: past + 60,
            user_id: "user-1".to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();

        assert!(keys.verify(&token).is_err());
    }
}
