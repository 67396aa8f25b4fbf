use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::PrescriptionStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: i64,
    pub medical_record_id: i64,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: Option<String>,
    pub quantity: Option<i64>,
    pub refills: i64,
    pub status: PrescriptionStatus,
    pub prescribed_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Fields accepted when prescribing against a record.
#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: Option<String>,
    pub quantity: Option<i64>,
    pub refills: i64,
}
