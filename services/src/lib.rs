// services/src/lib.rs

pub mod appointments;
pub mod directory;
pub mod identity;

pub use appointments::{AppointmentService, AppointmentView, CounterpartView};
pub use directory::{DirectoryService, DoctorListing};
pub use identity::{IdentityService, ProfileProvisioning, RegistrationOutcome};
