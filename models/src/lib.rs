// models/src/lib.rs

pub mod appointment;
pub mod doctor;
pub mod errors;
pub mod identity;

pub use appointment::{
    allowed_for_role, can_update, may_set_emergency, Appointment, AppointmentStatus, PaymentStatus,
};
pub use doctor::{DoctorProfile, ProfileUpdate, ScheduleEntry};
pub use errors::{DomainError, DomainResult};
pub use identity::{classify_registration, Identity, NewIdentity, Role};
