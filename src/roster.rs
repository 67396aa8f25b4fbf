//! Patient roster aggregation for the doctor dashboard.
//!
//! A doctor's roster is derived entirely from their appointment
//! documents; nothing here touches the user table. All appointments
//! count, cancelled ones included, since a cancelled visit still puts
//! the patient in the doctor's history.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Appointment, PatientSnapshot};

/// One patient as the doctor sees them, aggregated over every
/// appointment that patient ever booked with this doctor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub total_appointments: i64,
    /// Booking instant of the newest appointment, epoch milliseconds.
    pub last_appointment: i64,
}

struct Group<'a> {
    count: i64,
    last: i64,
    snapshot: &'a PatientSnapshot,
}

/// Group appointments by patient in a single pass.
///
/// Contact details come from the snapshot of the most recently booked
/// appointment, so a patient who updated their phone number between
/// visits shows the newer value. Output order is unspecified.
pub fn build_roster(appointments: &[Appointment]) -> Vec<PatientSummary> {
    let mut groups: HashMap<&str, Group<'_>> = HashMap::new();

    for appointment in appointments {
        match groups.get_mut(appointment.user_id.as_str()) {
            Some(group) => {
                group.count += 1;
                if appointment.date >= group.last {
                    group.last = appointment.date;
                    group.snapshot = &appointment.user_data;
                }
            }
            None => {
                groups.insert(
                    &appointment.user_id,
                    Group {
                        count: 1,
                        last: appointment.date,
                        snapshot: &appointment.user_data,
                    },
                );
            }
        }
    }

    groups
        .into_iter()
        .map(|(user_id, group)| PatientSummary {
            id: user_id.to_string(),
            name: group.snapshot.name.clone(),
            email: group.snapshot.email.clone(),
            phone: group.snapshot.phone.clone(),
            date_of_birth: group.snapshot.date_of_birth.clone(),
            total_appointments: group.count,
            last_appointment: group.last,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DoctorSnapshot, PaymentStatus};
    use uuid::Uuid;

    fn appointment(user_id: &str, name: &str, phone: &str, date: i64) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            doc_id: "doc-1".to_string(),
            slot_date: "2025-03-10".to_string(),
            slot_time: "10:00".to_string(),
            user_data: PatientSnapshot {
                name: name.to_string(),
                email: Some(format!("{user_id}@example.com")),
                phone: Some(phone.to_string()),
                date_of_birth: Some("1990-04-01".to_string()),
            },
            doc_data: DoctorSnapshot {
                name: "Dr. Adams".to_string(),
                speciality: "Cardiology".to_string(),
                fees: 120.0,
            },
            amount: 120.0,
            date,
            cancelled: false,
            is_completed: false,
            is_confirmed: None,
            payment: false,
            payment_status: PaymentStatus::Pending,
            paid_at: None,
        }
    }

    #[test]
    fn one_row_per_patient_with_counts() {
        let appointments = vec![
            appointment("user-a", "Alice", "111", 1_000),
            appointment("user-b", "Bob", "222", 2_000),
            appointment("user-a", "Alice", "111", 3_000),
            appointment("user-a", "Alice", "111", 2_500),
        ];

        let mut roster = build_roster(&appointments);
        roster.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].id, "user-a");
        assert_eq!(roster[0].total_appointments, 3);
        assert_eq!(roster[0].last_appointment, 3_000);
        assert_eq!(roster[1].id, "user-b");
        assert_eq!(roster[1].total_appointments, 1);
    }

    #[test]
    fn snapshot_comes_from_the_newest_appointment() {
        // Patient changed their phone between bookings; input arrives
        // out of chronological order.
        let appointments = vec![
            appointment("user-a", "Alice", "555-new", 9_000),
            appointment("user-a", "Alice", "555-old", 1_000),
            appointment("user-a", "Alice", "555-mid", 5_000),
        ];

        let roster = build_roster(&appointments);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].phone.as_deref(), Some("555-new"));
        assert_eq!(roster[0].last_appointment, 9_000);
    }

    #[test]
    fn cancelled_appointments_still_count() {
        let mut cancelled = appointment("user-a", "Alice", "111", 4_000);
        cancelled.cancelled = true;
        let appointments = vec![appointment("user-a", "Alice", "111", 1_000), cancelled];

        let roster = build_roster(&appointments);
        assert_eq!(roster[0].total_appointments, 2);
        assert_eq!(roster[0].last_appointment, 4_000);
    }

    #[test]
    fn empty_input_yields_empty_roster() {
        assert!(build_roster(&[]).is_empty());
    }

    #[test]
    fn summary_serializes_with_wire_field_names() {
        let roster = build_roster(&[appointment("user-a", "Alice", "111", 1_000)]);
        let json = serde_json::to_value(&roster[0]).unwrap();

        assert_eq!(json["_id"], "user-a");
        assert_eq!(json["totalAppointments"], 1);
        assert_eq!(json["lastAppointment"], 1_000);
        assert_eq!(json["dateOfBirth"], "1990-04-01");
    }
}
