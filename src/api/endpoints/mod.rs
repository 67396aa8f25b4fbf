//! Route handlers, grouped the way the router mounts them.
//!
//! Shapes shared across groups live here: the login token envelope,
//! the appointment-plus-status view, and the status transition check
//! every cancel/update path goes through.

pub mod admin;
pub mod doctor;
pub mod records;
pub mod user;

use serde::Serialize;

use crate::api::error::ApiError;
use crate::models::{Appointment, AppointmentStatus};

/// `{"success": true, "token": "..."}` returned by all three logins.
#[derive(Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

impl TokenResponse {
    pub(crate) fn new(token: String) -> Self {
        Self {
            success: true,
            token,
        }
    }
}

/// An appointment as clients consume it: the stored document plus the
/// status projected from its flags.
#[derive(Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    appointment: Appointment,
    status: AppointmentStatus,
}

impl From<Appointment> for AppointmentView {
    fn from(appointment: Appointment) -> Self {
        let status = appointment.status();
        Self {
            appointment,
            status,
        }
    }
}

/// Check a status change and produce the flag triple to persist.
///
/// Illegal moves (Pending straight to Completed, anything out of a
/// terminal state) are a validation error naming both ends.
pub(crate) fn transition_flags(
    current: AppointmentStatus,
    target: AppointmentStatus,
) -> Result<(bool, bool, Option<bool>), ApiError> {
    if !current.can_transition_to(&target) {
        return Err(ApiError::Validation(format!(
            "Cannot change appointment status from {} to {}",
            current.as_str(),
            target.as_str()
        )));
    }
    Ok(target.flag_triple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DoctorSnapshot, PatientSnapshot, PaymentStatus};
    use uuid::Uuid;

    fn make_appointment() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            doc_id: "d1".into(),
            slot_date: "2025-06-01".into(),
            slot_time: "10:00".into(),
            user_data: PatientSnapshot {
                name: "Jane Roe".into(),
                email: Some("jane@example.com".into()),
                phone: None,
                date_of_birth: None,
            },
            doc_data: DoctorSnapshot {
                name: "Dr. Patel".into(),
                speciality: "Cardiology".into(),
                fees: 120.0,
            },
            amount: 120.0,
            date: 1_748_770_000_000,
            cancelled: false,
            is_completed: false,
            is_confirmed: None,
            payment: false,
            payment_status: PaymentStatus::Pending,
            paid_at: None,
        }
    }

    #[test]
    fn appointment_view_carries_the_projected_status() {
        let mut appointment = make_appointment();
        appointment.is_confirmed = Some(true);
        let value = serde_json::to_value(AppointmentView::from(appointment)).unwrap();
        assert_eq!(value["status"], "confirmed");
        assert!(value["_id"].is_string());
        assert_eq!(value["isConfirmed"], true);
    }

    #[test]
    fn transition_rejections_name_both_states() {
        let err = transition_flags(AppointmentStatus::Pending, AppointmentStatus::Completed)
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("from pending to completed"));
    }

    #[test]
    fn legal_transition_yields_the_target_triple() {
        let flags =
            transition_flags(AppointmentStatus::Confirmed, AppointmentStatus::Completed).unwrap();
        assert_eq!(flags, (false, true, Some(true)));
    }
}
