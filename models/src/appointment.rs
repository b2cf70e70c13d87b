// models/src/appointment.rs

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;
use crate::identity::Role;

/// Appointment lifecycle states. There is deliberately no transition graph
/// between these values: any value may replace any other, and no state is
/// terminal. The enforced constraint is which role may set which value —
/// see the predicates at the bottom of this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Canceled,
    Completed,
    Rescheduled,
}

impl FromStr for AppointmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "canceled" => Ok(AppointmentStatus::Canceled),
            "completed" => Ok(AppointmentStatus::Completed),
            "rescheduled" => Ok(AppointmentStatus::Rescheduled),
            other => Err(DomainError::validation(format!(
                "'{}' is not a valid appointment status.",
                other
            ))),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Canceled => "canceled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Rescheduled => "rescheduled",
        };
        write!(f, "{}", s)
    }
}

/// Payment is simulated: bookings are created already settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// A booking between one customer identity and one doctor identity. Both
/// references are weak ids checked at use time; appointments are never
/// deleted — cancellation is a status value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    #[serde(default)]
    pub documents: Vec<String>,
    pub status: AppointmentStatus,
    pub is_emergency: bool,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// A fresh booking: pending, not an emergency, payment already settled.
    pub fn new(
        customer_id: Uuid,
        doctor_id: Uuid,
        appointment_date: DateTime<Utc>,
        documents: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            customer_id,
            doctor_id,
            appointment_date,
            documents,
            status: AppointmentStatus::Pending,
            is_emergency: false,
            payment_status: PaymentStatus::Paid,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Whether `requester` may move this appointment to `new_status` at all.
/// Admins always may; doctors only on their own queue; customers only to
/// cancel their own booking.
pub fn can_update(
    role: Role,
    requester: Uuid,
    appointment: &Appointment,
    new_status: AppointmentStatus,
) -> bool {
    match role {
        Role::Admin => true,
        Role::Doctor => appointment.doctor_id == requester,
        Role::Customer => {
            appointment.customer_id == requester && new_status == AppointmentStatus::Canceled
        }
    }
}

/// Whether `role` may set this status value in general, independent of
/// ownership.
pub fn allowed_for_role(role: Role, status: AppointmentStatus) -> bool {
    match role {
        Role::Admin => true,
        Role::Doctor => matches!(
            status,
            AppointmentStatus::Scheduled
                | AppointmentStatus::Completed
                | AppointmentStatus::Rescheduled
                | AppointmentStatus::Canceled
        ),
        Role::Customer => status == AppointmentStatus::Canceled,
    }
}

/// Whether `requester` may flip the emergency flag on this appointment.
/// Customers never may; a flag they submit is dropped silently.
pub fn may_set_emergency(role: Role, requester: Uuid, appointment: &Appointment) -> bool {
    match role {
        Role::Admin => true,
        Role::Doctor => appointment.doctor_id == requester,
        Role::Customer => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn appointment(customer: Uuid, doctor: Uuid) -> Appointment {
        Appointment::new(customer, doctor, Utc::now(), vec![])
    }

    #[test]
    fn should_create_pending_and_paid() {
        let appt = appointment(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert_eq!(appt.payment_status, PaymentStatus::Paid);
        assert!(!appt.is_emergency);
    }

    #[test]
    fn should_let_customer_cancel_only_their_own() {
        let customer = Uuid::new_v4();
        let appt = appointment(customer, Uuid::new_v4());

        assert!(can_update(
            Role::Customer,
            customer,
            &appt,
            AppointmentStatus::Canceled
        ));
        assert!(!can_update(
            Role::Customer,
            customer,
            &appt,
            AppointmentStatus::Completed
        ));
        assert!(!can_update(
            Role::Customer,
            Uuid::new_v4(),
            &appt,
            AppointmentStatus::Canceled
        ));
    }

    #[test]
    fn should_restrict_doctor_to_own_queue() {
        let doctor = Uuid::new_v4();
        let appt = appointment(Uuid::new_v4(), doctor);

        assert!(can_update(
            Role::Doctor,
            doctor,
            &appt,
            AppointmentStatus::Scheduled
        ));
        assert!(!can_update(
            Role::Doctor,
            Uuid::new_v4(),
            &appt,
            AppointmentStatus::Scheduled
        ));
    }

    #[test]
    fn should_let_admin_set_anything_anywhere() {
        let appt = appointment(Uuid::new_v4(), Uuid::new_v4());
        assert!(can_update(
            Role::Admin,
            Uuid::new_v4(),
            &appt,
            AppointmentStatus::Pending
        ));
        assert!(allowed_for_role(Role::Admin, AppointmentStatus::Pending));
    }

    #[test]
    fn should_reject_pending_as_doctor_status_value() {
        assert!(!allowed_for_role(Role::Doctor, AppointmentStatus::Pending));
        assert!(allowed_for_role(Role::Doctor, AppointmentStatus::Rescheduled));
        assert!(!allowed_for_role(Role::Customer, AppointmentStatus::Completed));
    }

    #[test]
    fn should_gate_emergency_flag_by_role_and_ownership() {
        let doctor = Uuid::new_v4();
        let customer = Uuid::new_v4();
        let appt = appointment(customer, doctor);

        assert!(may_set_emergency(Role::Doctor, doctor, &appt));
        assert!(!may_set_emergency(Role::Doctor, Uuid::new_v4(), &appt));
        assert!(may_set_emergency(Role::Admin, Uuid::new_v4(), &appt));
        assert!(!may_set_emergency(Role::Customer, customer, &appt));
    }

    #[test]
    fn should_parse_and_render_status_values() {
        assert_eq!(
            "rescheduled".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Rescheduled
        );
        assert!("archived".parse::<AppointmentStatus>().is_err());
        assert_eq!(AppointmentStatus::Canceled.to_string(), "canceled");
    }

    #[test]
    fn should_serialize_with_wire_casing() {
        let appt = appointment(Uuid::new_v4(), Uuid::new_v4());
        let json = serde_json::to_value(&appt).unwrap();
        assert!(json.get("customerId").is_some());
        assert!(json.get("appointmentDate").is_some());
        assert_eq!(json["status"], "pending");
        assert_eq!(json["paymentStatus"], "paid");
        assert_eq!(json["isEmergency"], false);
    }
}
