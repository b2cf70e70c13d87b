// services/src/directory.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use models::{DoctorProfile, DomainError, DomainResult, Identity, ProfileUpdate, Role};
use storage::ClinicStore;

/// An approved doctor joined with their profile, as shown in the public
/// directory.
#[derive(Debug, Clone)]
pub struct DoctorListing {
    pub identity: Identity,
    pub profile: DoctorProfile,
}

/// Directory queries plus the admin-controlled approval gate.
pub struct DirectoryService {
    store: Arc<dyn ClinicStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Every approved doctor with their profile. A doctor whose profile is
    /// missing gets the placeholder rather than being dropped; that state
    /// should not occur, but the directory must not lose entries over it.
    pub async fn list_approved(&self) -> DomainResult<Vec<DoctorListing>> {
        let doctors = self.store.doctors_by_approval(true).await?;
        let mut listings = Vec::with_capacity(doctors.len());
        for identity in doctors {
            let profile = match self.store.profile_for(identity.id).await? {
                Some(profile) => profile,
                None => DoctorProfile::placeholder(identity.id),
            };
            listings.push(DoctorListing { identity, profile });
        }
        Ok(listings)
    }

    pub async fn own_profile(&self, doctor_id: Uuid) -> DomainResult<DoctorProfile> {
        self.store.profile_for(doctor_id).await?.ok_or_else(|| {
            DomainError::not_found(
                "Doctor profile not found for this user. Please click \"Update Profile\" to create and fill out your profile.",
            )
        })
    }

    /// Applies a partial update to the caller's own profile. Absent fields
    /// are left as they are.
    pub async fn update_own_profile(
        &self,
        doctor_id: Uuid,
        update: &ProfileUpdate,
    ) -> DomainResult<DoctorProfile> {
        let updated = self
            .store
            .apply_profile_update(doctor_id, update)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(
                    "Doctor profile not found for updating. Please ensure your profile exists.",
                )
            })?;
        info!(doctor = %doctor_id, "doctor profile updated");
        Ok(updated)
    }

    /// Doctor accounts waiting on admin approval.
    pub async fn list_pending(&self) -> DomainResult<Vec<Identity>> {
        self.store.doctors_by_approval(false).await
    }

    /// Opens the approval gate for a doctor account. Idempotent when the
    /// account is already approved.
    pub async fn approve(&self, identity_id: Uuid) -> DomainResult<()> {
        let mut identity = self
            .store
            .identity_by_id(identity_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Doctor not found"))?;

        if identity.role != Role::Doctor {
            return Err(DomainError::validation("User is not a doctor"));
        }
        if identity.is_approved {
            return Ok(());
        }

        identity.is_approved = true;
        identity.updated_at = Utc::now();
        self.store.update_identity(&identity).await?;
        info!(doctor = %identity.email, id = %identity.id, "doctor account approved");
        Ok(())
    }
}
