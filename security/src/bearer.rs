// security/src/bearer.rs

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::{Claims, TokenKeys};

/// Rejection for a missing or unverifiable bearer token. Always a 401 so a
/// caller cannot distinguish absent, malformed and forged tokens beyond the
/// message text.
#[derive(Debug)]
pub struct BearerRejection(pub String);

impl IntoResponse for BearerRejection {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "message": self.0,
        }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Extracts and verifies the `Authorization: Bearer` header. Runs before
/// any role or ownership check; a failure here short-circuits the request.
#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    TokenKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BearerRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| BearerRejection("Not authorized, no token provided".to_string()))?;

        let keys = TokenKeys::from_ref(state);
        keys.verify(token)
            .map_err(|err| BearerRejection(err.to_string()))
    }
}
