// rest_api/src/handlers/mod.rs

pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod users;

use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::{Identity, Role};

/// Public shape of an identity: everything except the credential hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityView {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Identity> for IdentityView {
    fn from(identity: Identity) -> Self {
        IdentityView {
            id: identity.id,
            name: identity.name,
            username: identity.username,
            email: identity.email,
            role: identity.role,
            is_approved: identity.is_approved,
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

// Handler for the /api/health endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "message": "Docspot API is running..." })),
    )
}
