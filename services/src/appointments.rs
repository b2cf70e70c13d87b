// services/src/appointments.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use models::{
    allowed_for_role, can_update, may_set_emergency, Appointment, AppointmentStatus, DomainError,
    DomainResult, Identity, Role,
};
use storage::{AppointmentScope, ClinicStore};

/// The counterpart's public identity attached to a listed appointment.
#[derive(Debug, Clone)]
pub struct CounterpartView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// One appointment as listed. Customers get the doctor's identity, doctors
/// get the customer's, admins get both. A counterpart that no longer
/// resolves is simply absent.
#[derive(Debug, Clone)]
pub struct AppointmentView {
    pub appointment: Appointment,
    pub customer: Option<CounterpartView>,
    pub doctor: Option<CounterpartView>,
}

/// The appointment ledger: booking, role-scoped listing, and the status
/// state machine.
pub struct AppointmentService {
    store: Arc<dyn ClinicStore>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Books `customer_id` with `doctor_id`. The appointment insert is
    /// authoritative; the counter increment that follows is informational,
    /// but a failure there is still surfaced rather than dropped.
    pub async fn book(
        &self,
        customer_id: Uuid,
        doctor_id: Uuid,
        appointment_date: DateTime<Utc>,
        documents: Vec<String>,
    ) -> DomainResult<Appointment> {
        info!(customer = %customer_id, doctor = %doctor_id, date = %appointment_date, "booking request");

        let doctor = self.store.identity_by_id(doctor_id).await?;
        let available = matches!(
            &doctor,
            Some(identity) if identity.role == Role::Doctor && identity.is_approved
        );
        if !available {
            warn!(doctor = %doctor_id, "booking rejected: doctor unavailable or unapproved");
            return Err(DomainError::validation(
                "The selected doctor is not available for appointments or is not yet approved.",
            ));
        }

        if self.store.profile_for(doctor_id).await?.is_none() {
            warn!(doctor = %doctor_id, "booking rejected: doctor profile missing");
            return Err(DomainError::not_found(
                "Doctor profile data missing, cannot book appointment.",
            ));
        }

        let appointment = Appointment::new(customer_id, doctor_id, appointment_date, documents);
        self.store.insert_appointment(&appointment).await?;
        self.store.increment_profile_appointments(doctor_id).await?;
        info!(appointment = %appointment.id, doctor = %doctor_id, "appointment booked, counter incremented");

        Ok(appointment)
    }

    /// Appointments visible to `requester`, scoped by role and enriched
    /// with the counterpart's name and email.
    pub async fn list_mine(&self, requester: &Identity) -> DomainResult<Vec<AppointmentView>> {
        let scope = match requester.role {
            Role::Customer => AppointmentScope::ForCustomer(requester.id),
            Role::Doctor => AppointmentScope::ForDoctor(requester.id),
            Role::Admin => AppointmentScope::All,
        };
        let appointments = self.store.appointments_in(scope).await?;

        let mut views = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let customer = match requester.role {
                Role::Doctor | Role::Admin => self.counterpart(appointment.customer_id).await?,
                Role::Customer => None,
            };
            let doctor = match requester.role {
                Role::Customer | Role::Admin => self.counterpart(appointment.doctor_id).await?,
                Role::Doctor => None,
            };
            views.push(AppointmentView {
                appointment,
                customer,
                doctor,
            });
        }
        Ok(views)
    }

    async fn counterpart(&self, id: Uuid) -> DomainResult<Option<CounterpartView>> {
        Ok(self
            .store
            .identity_by_id(id)
            .await?
            .map(|identity| CounterpartView {
                id: identity.id,
                name: identity.name,
                email: identity.email,
            }))
    }

    /// Moves an appointment to `new_status` on behalf of `requester`.
    /// Checks run in order: existence, ownership authorization, role/value
    /// validation. Status and emergency flag land in one atomic write; an
    /// emergency flag the requester may not set is dropped silently.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        requester: &Identity,
        new_status: AppointmentStatus,
        is_emergency: Option<bool>,
    ) -> DomainResult<Appointment> {
        let appointment = self
            .store
            .appointment_by_id(appointment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment not found."))?;

        if !can_update(requester.role, requester.id, &appointment, new_status) {
            warn!(
                appointment = %appointment_id,
                requester = %requester.id,
                role = %requester.role,
                "unauthorized status update attempt"
            );
            return Err(DomainError::authorization(
                "You are not authorized to update this appointment status.",
            ));
        }

        if !allowed_for_role(requester.role, new_status) {
            let message = match requester.role {
                Role::Customer => "Customers can only cancel their appointments.",
                _ => "Invalid status update for a doctor.",
            };
            return Err(DomainError::validation(message));
        }

        let emergency = match is_emergency {
            Some(flag) if may_set_emergency(requester.role, requester.id, &appointment) => {
                Some(flag)
            }
            _ => None,
        };

        let updated = self
            .store
            .set_appointment_status(appointment_id, new_status, emergency)
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment not found."))?;
        info!(appointment = %appointment_id, status = %updated.status, "appointment status updated");
        Ok(updated)
    }
}
