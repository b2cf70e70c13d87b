// storage/src/lib.rs

use async_trait::async_trait;
use uuid::Uuid;

use models::{Appointment, AppointmentStatus, DoctorProfile, DomainResult, Identity, ProfileUpdate};

mod sled_store;

pub use sled_store::SledStore;

/// Which slice of the appointment ledger a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentScope {
    All,
    ForCustomer(Uuid),
    ForDoctor(Uuid),
}

/// Durable-store facade over the three entity collections. All methods are
/// single round trips; the multi-step invariants (uniqueness reservation,
/// counter increment, combined status+emergency write) are atomic at the
/// store level so concurrent requests cannot interleave into lost updates.
#[async_trait]
pub trait ClinicStore: Send + Sync + 'static {
    /// Inserts a new identity, atomically reserving its email and username.
    /// Fails with `Duplicate` when either is already taken.
    async fn insert_identity(&self, identity: &Identity) -> DomainResult<()>;
    /// Rewrites an existing identity record. Callers never change username
    /// or email in scope, so the uniqueness indexes are left untouched.
    async fn update_identity(&self, identity: &Identity) -> DomainResult<()>;
    async fn identity_by_id(&self, id: Uuid) -> DomainResult<Option<Identity>>;
    async fn identity_by_username(&self, username: &str) -> DomainResult<Option<Identity>>;
    async fn identity_by_email(&self, email: &str) -> DomainResult<Option<Identity>>;
    /// All doctor identities with the given approval state, oldest first.
    async fn doctors_by_approval(&self, approved: bool) -> DomainResult<Vec<Identity>>;

    async fn put_profile(&self, profile: &DoctorProfile) -> DomainResult<()>;
    async fn profile_for(&self, doctor_id: Uuid) -> DomainResult<Option<DoctorProfile>>;
    /// Atomically merges a partial update into the stored profile. Returns
    /// `None` when no profile exists for this doctor.
    async fn apply_profile_update(
        &self,
        doctor_id: Uuid,
        update: &ProfileUpdate,
    ) -> DomainResult<Option<DoctorProfile>>;
    /// Atomically bumps the doctor's appointment counter by one.
    async fn increment_profile_appointments(&self, doctor_id: Uuid) -> DomainResult<()>;

    async fn insert_appointment(&self, appointment: &Appointment) -> DomainResult<()>;
    async fn appointment_by_id(&self, id: Uuid) -> DomainResult<Option<Appointment>>;
    async fn appointments_in(&self, scope: AppointmentScope) -> DomainResult<Vec<Appointment>>;
    /// Atomically overwrites status and, when given, the emergency flag in
    /// one record update. Returns `None` when the appointment is gone.
    async fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        is_emergency: Option<bool>,
    ) -> DomainResult<Option<Appointment>>;
}
