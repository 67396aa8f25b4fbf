//! Appointment documents and their status machinery.
//!
//! Stored rows carry three legacy flags (`cancelled`, `is_completed`,
//! `is_confirmed`) instead of a status column; `is_confirmed` is
//! nullable because rows predate the field. Reads project the flags
//! into an [`AppointmentStatus`]; writes go through the transition
//! rules below and always persist a full, non-contradictory triple.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AppointmentStatus, PaymentStatus};

/// Patient fields embedded into the appointment at booking time.
/// Listings and the roster render from this snapshot, never from the
/// live user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSnapshot {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

/// Doctor fields embedded into the appointment at booking time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSnapshot {
    pub name: String,
    pub speciality: String,
    pub fees: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: String,
    pub doc_id: String,
    pub slot_date: String,
    pub slot_time: String,
    pub user_data: PatientSnapshot,
    pub doc_data: DoctorSnapshot,
    pub amount: f64,
    /// Booking instant, epoch milliseconds.
    pub date: i64,
    pub cancelled: bool,
    pub is_completed: bool,
    pub is_confirmed: Option<bool>,
    pub payment: bool,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<NaiveDateTime>,
}

impl Appointment {
    pub fn status(&self) -> AppointmentStatus {
        AppointmentStatus::project(self.cancelled, self.is_completed, self.is_confirmed)
    }
}

impl AppointmentStatus {
    /// Project the stored flag triple into a status.
    ///
    /// Precedence: cancelled wins over completed wins over confirmed;
    /// anything else (including `is_confirmed` NULL or false) is
    /// pending. Total over all eight-plus-NULL combinations.
    pub fn project(cancelled: bool, is_completed: bool, is_confirmed: Option<bool>) -> Self {
        if cancelled {
            AppointmentStatus::Cancelled
        } else if is_completed {
            AppointmentStatus::Completed
        } else if is_confirmed == Some(true) {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Pending
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Pending can be confirmed or cancelled; Confirmed can be
    /// completed or cancelled. Completed and Cancelled are terminal,
    /// and Pending can never jump straight to Completed.
    pub fn can_transition_to(&self, next: &AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }

    /// The full flag triple `(cancelled, is_completed, is_confirmed)`
    /// a row in this status carries when written by us. NULL
    /// `is_confirmed` only ever comes from rows predating the flag.
    pub fn flag_triple(&self) -> (bool, bool, Option<bool>) {
        match self {
            AppointmentStatus::Pending => (false, false, Some(false)),
            AppointmentStatus::Confirmed => (false, false, Some(true)),
            AppointmentStatus::Completed => (false, true, Some(true)),
            AppointmentStatus::Cancelled => (true, false, Some(false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_precedence_cancelled_wins() {
        // cancelled beats every other flag combination
        for completed in [false, true] {
            for confirmed in [None, Some(false), Some(true)] {
                assert_eq!(
                    AppointmentStatus::project(true, completed, confirmed),
                    AppointmentStatus::Cancelled
                );
            }
        }
    }

    #[test]
    fn projection_completed_beats_confirmed() {
        assert_eq!(
            AppointmentStatus::project(false, true, Some(true)),
            AppointmentStatus::Completed
        );
    }

    #[test]
    fn projection_confirmed_requires_true() {
        assert_eq!(
            AppointmentStatus::project(false, false, Some(true)),
            AppointmentStatus::Confirmed
        );
        // NULL and explicit false both read as pending
        assert_eq!(
            AppointmentStatus::project(false, false, None),
            AppointmentStatus::Pending
        );
        assert_eq!(
            AppointmentStatus::project(false, false, Some(false)),
            AppointmentStatus::Pending
        );
    }

    #[test]
    fn projection_is_total() {
        for cancelled in [false, true] {
            for completed in [false, true] {
                for confirmed in [None, Some(false), Some(true)] {
                    // Must not panic, and must land on one of the four statuses
                    let status = AppointmentStatus::project(cancelled, completed, confirmed);
                    assert!(matches!(
                        status,
                        AppointmentStatus::Pending
                            | AppointmentStatus::Confirmed
                            | AppointmentStatus::Completed
                            | AppointmentStatus::Cancelled
                    ));
                }
            }
        }
    }

    #[test]
    fn legal_transitions() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(&Confirmed));
        assert!(Pending.can_transition_to(&Cancelled));
        assert!(Confirmed.can_transition_to(&Completed));
        assert!(Confirmed.can_transition_to(&Cancelled));
    }

    #[test]
    fn pending_cannot_skip_to_completed() {
        assert!(!AppointmentStatus::Pending.can_transition_to(&AppointmentStatus::Completed));
    }

    #[test]
    fn terminal_states_allow_nothing() {
        use AppointmentStatus::*;
        for next in [Pending, Confirmed, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(&next));
            assert!(!Cancelled.can_transition_to(&next));
        }
    }

    #[test]
    fn flag_triples_project_back_to_their_status() {
        use AppointmentStatus::*;
        for status in [Pending, Confirmed, Completed, Cancelled] {
            let (cancelled, completed, confirmed) = status.flag_triple();
            assert_eq!(AppointmentStatus::project(cancelled, completed, confirmed), status);
        }
    }
}
