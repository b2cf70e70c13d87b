// rest_api/src/guards.rs

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use models::{DomainError, Identity, Role};
use security::Claims;

use crate::{ApiError, AppState};

/// Any authenticated principal: verified bearer claims resolved back to a
/// stored identity. Guards compose in order — authentication, then role,
/// then whatever ownership checks the operation itself performs.
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError(DomainError::authentication(rejection.0)))?;
        let identity = state.identities.resolve_token(&claims).await?;
        Ok(Self(identity))
    }
}

/// Authenticated principal holding the admin role.
pub struct AdminIdentity(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(parts, state).await?;
        if identity.role != Role::Admin {
            return Err(ApiError(DomainError::authorization(
                "Not authorized as an admin",
            )));
        }
        Ok(Self(identity))
    }
}

/// Authenticated principal holding the doctor role.
pub struct DoctorIdentity(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for DoctorIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(parts, state).await?;
        if identity.role != Role::Doctor {
            return Err(ApiError(DomainError::authorization(
                "Not authorized as a doctor",
            )));
        }
        Ok(Self(identity))
    }
}
