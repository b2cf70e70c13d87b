// rest_api/src/handlers/users.rs

use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use models::Role;

use crate::guards::CurrentIdentity;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_approved: bool,
}

// Handler for GET /api/users/profile.
pub async fn profile(CurrentIdentity(identity): CurrentIdentity) -> Json<UserProfileResponse> {
    Json(UserProfileResponse {
        id: identity.id,
        name: identity.name,
        email: identity.email,
        role: identity.role,
        is_approved: identity.is_approved,
    })
}
