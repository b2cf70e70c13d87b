// rest_api/src/handlers/doctors.rs

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::{DoctorProfile, ProfileUpdate};

use crate::guards::{AdminIdentity, DoctorIdentity};
use crate::handlers::IdentityView;
use crate::{ApiError, AppState};

/// A directory entry: the doctor's public identity fields with the profile
/// attached.
#[derive(Debug, Serialize)]
pub struct DoctorListingResponse {
    #[serde(flatten)]
    pub identity: IdentityView,
    pub profile: DoctorProfile,
}

// Handler for GET /api/doctors — public, no auth.
pub async fn list_approved(
    State(state): State<AppState>,
) -> Result<Json<Vec<DoctorListingResponse>>, ApiError> {
    let listings = state.directory.list_approved().await?;
    Ok(Json(
        listings
            .into_iter()
            .map(|listing| DoctorListingResponse {
                identity: listing.identity.into(),
                profile: listing.profile,
            })
            .collect(),
    ))
}

// Handler for GET /api/doctors/profile.
pub async fn own_profile(
    State(state): State<AppState>,
    DoctorIdentity(identity): DoctorIdentity,
) -> Result<Json<DoctorProfile>, ApiError> {
    Ok(Json(state.directory.own_profile(identity.id).await?))
}

// Handler for PUT /api/doctors/profile.
pub async fn update_profile(
    State(state): State<AppState>,
    DoctorIdentity(identity): DoctorIdentity,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<DoctorProfile>, ApiError> {
    Ok(Json(
        state
            .directory
            .update_own_profile(identity.id, &update)
            .await?,
    ))
}

// Handler for GET /api/doctors/pending.
pub async fn pending(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
) -> Result<Json<Vec<IdentityView>>, ApiError> {
    let pending = state.directory.list_pending().await?;
    Ok(Json(pending.into_iter().map(IdentityView::from).collect()))
}

// Handler for PUT /api/doctors/approve/:id.
pub async fn approve(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.directory.approve(id).await?;
    Ok(Json(json!({ "message": "Doctor approved successfully" })))
}
