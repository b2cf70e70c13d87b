// rest_api/src/handlers/appointments.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{Appointment, AppointmentStatus, DomainError};
use services::AppointmentView;

use crate::guards::CurrentIdentity;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    #[serde(default)]
    pub doctor_id: String,
    pub appointment_date: DateTime<Utc>,
    #[serde(default)]
    pub documents: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub message: String,
    pub appointment: Appointment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
    pub is_emergency: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// One appointment on the wire, with counterpart identities attached where
/// the caller's role warrants them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<PartyResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<PartyResponse>,
}

impl From<AppointmentView> for AppointmentResponse {
    fn from(view: AppointmentView) -> Self {
        AppointmentResponse {
            appointment: view.appointment,
            customer: view.customer.map(|party| PartyResponse {
                id: party.id,
                name: party.name,
                email: party.email,
            }),
            doctor: view.doctor.map(|party| PartyResponse {
                id: party.id,
                name: party.name,
                email: party.email,
            }),
        }
    }
}

// Handler for POST /api/appointments/book.
pub async fn book(
    State(state): State<AppState>,
    CurrentIdentity(customer): CurrentIdentity,
    Json(payload): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let doctor_id = parse_id(&payload.doctor_id)?;
    let appointment = state
        .appointments
        .book(
            customer.id,
            doctor_id,
            payload.appointment_date,
            payload.documents,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            message: "Appointment booked successfully. Payment confirmed.".to_string(),
            appointment,
        }),
    ))
}

// Handler for GET /api/appointments/my-appointments.
pub async fn my_appointments(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<Vec<AppointmentResponse>>, ApiError> {
    let views = state.appointments.list_mine(&identity).await?;
    Ok(Json(views.into_iter().map(AppointmentResponse::from).collect()))
}

// Handler for PUT /api/appointments/:id/status.
pub async fn update_status(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let status = payload.status.parse::<AppointmentStatus>().map_err(ApiError)?;
    let appointment = state
        .appointments
        .update_status(id, &identity, status, payload.is_emergency)
        .await?;

    Ok(Json(AppointmentResponse {
        appointment,
        customer: None,
        doctor: None,
    }))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError(DomainError::validation("Invalid doctor id provided.")))
}
