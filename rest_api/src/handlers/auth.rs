// rest_api/src/handlers/auth.rs

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{Identity, NewIdentity, Role};

use crate::{ApiError, AppState};

// Missing fields deserialize to empty strings so the service can report
// them as one validation failure instead of a body-shape rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Session payload returned by both register and login: the identity's
/// public fields plus a fresh capability token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_approved: bool,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SessionResponse {
    fn new(identity: Identity, token: String, message: Option<String>) -> Self {
        SessionResponse {
            id: identity.id,
            name: identity.name,
            username: identity.username,
            email: identity.email,
            role: identity.role,
            is_approved: identity.is_approved,
            token,
            message,
        }
    }
}

// Handler for POST /api/auth/register.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let outcome = state
        .identities
        .register(NewIdentity {
            name: payload.name,
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(
            outcome.identity,
            outcome.token,
            Some(outcome.message),
        )),
    ))
}

// Handler for POST /api/auth/login.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (identity, token) = state
        .identities
        .authenticate(&payload.email, &payload.password)
        .await?;

    Ok(Json(SessionResponse::new(identity, token, None)))
}
