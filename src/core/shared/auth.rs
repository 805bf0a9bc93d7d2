//! Caller identity for per-user resources (the inbox).
//!
//! Tokens are the HS256 JWTs issued by the hosted auth provider; the user id
//! is the `sub` claim. Without a configured secret the `x-user-id` header is
//! trusted, which is only meant for local development.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
}

fn unauthorized(message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": message })),
    )
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn user_from_token(token: &str, secret: &str) -> Option<Uuid> {
    let mut validation = Validation::default();
    // Supabase tokens carry aud = "authenticated"; audience is not pinned here.
    validation.validate_aud = false;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .ok()?;
    Uuid::parse_str(&data.claims.sub).ok()
}

pub fn user_from_header(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match state.config.auth.jwt_secret.as_deref() {
            Some(secret) => {
                let token = extract_bearer_token(&parts.headers)
                    .ok_or_else(|| unauthorized("No authentication token"))?;
                let id = user_from_token(token, secret)
                    .ok_or_else(|| unauthorized("Invalid token"))?;
                Ok(CurrentUser { id })
            }
            None => user_from_header(&parts.headers)
                .map(|id| CurrentUser { id })
                .ok_or_else(|| unauthorized("Authentication required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
        aud: String,
    }

    fn token_for(sub: &str, secret: &str, exp: i64) -> String {
        let claims = TestClaims {
            sub: sub.to_string(),
            exp,
            aud: "authenticated".to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_user() {
        let user_id = Uuid::new_v4();
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = token_for(&user_id.to_string(), "secret", exp);
        assert_eq!(user_from_token(&token, "secret"), Some(user_id));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = token_for(&Uuid::new_v4().to_string(), "secret", exp);
        assert_eq!(user_from_token(&token, "other"), None);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let exp = chrono::Utc::now().timestamp() - 3600;
        let token = token_for(&Uuid::new_v4().to_string(), "secret", exp);
        assert_eq!(user_from_token(&token, "secret"), None);
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = token_for("not-a-uuid", "secret", exp);
        assert_eq!(user_from_token(&token, "secret"), None);
    }

    #[test]
    fn test_header_extraction() {
        let user_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_str(&user_id.to_string()).unwrap(),
        );
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));

        assert_eq!(user_from_header(&headers), Some(user_id));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def"));
    }
}
