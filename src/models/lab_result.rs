use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{LabCategory, LabStatus};

/// A lab order attached to a visit record. `test_results` holds the
/// structured findings as JSON text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResult {
    pub id: i64,
    pub medical_record_id: i64,
    pub test_name: String,
    pub test_category: LabCategory,
    pub test_results: Option<String>,
    pub normal_range: Option<String>,
    pub status: LabStatus,
    pub lab_technician: Option<String>,
    pub ordered_by: String,
    pub ordered_date: NaiveDateTime,
    pub completed_date: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub file_path: Option<String>,
}

/// Fields accepted when ordering a lab against a record.
#[derive(Debug, Clone)]
pub struct NewLabResult {
    pub test_name: String,
    pub test_category: LabCategory,
    pub test_results: Option<String>,
    pub normal_range: Option<String>,
    pub status: LabStatus,
    pub lab_technician: Option<String>,
    pub ordered_by: String,
    pub notes: Option<String>,
    pub file_path: Option<String>,
}
