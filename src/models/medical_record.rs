use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{RecordStatus, VisitType};

/// One visit entry in a patient's chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: String,
    pub appointment_id: Option<String>,
    pub visit_date: NaiveDateTime,
    pub visit_type: VisitType,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<NaiveDate>,
    pub status: RecordStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fields accepted when opening a new record. Everything else
/// defaults (status active, no follow-up).
#[derive(Debug, Clone)]
pub struct NewMedicalRecord {
    pub doctor_id: String,
    pub appointment_id: Option<String>,
    pub visit_date: NaiveDateTime,
    pub visit_type: VisitType,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<NaiveDate>,
}

/// Partial update: `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct MedicalRecordUpdate {
    pub visit_date: Option<NaiveDateTime>,
    pub visit_type: Option<VisitType>,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub follow_up_required: Option<bool>,
    pub follow_up_date: Option<NaiveDate>,
    pub status: Option<RecordStatus>,
}

/// Parse a client-supplied visit date. Accepts a full datetime
/// (`2025-03-14T09:30:00`, with optional trailing zone) or a bare
/// date, which becomes midnight.
pub fn parse_visit_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
