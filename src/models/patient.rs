use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::BloodType;

/// A clinical-store patient chart, bridged to a directory user
/// through `external_user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i64,
    /// Directory user id; serialized as `userId` per the wire contract.
    #[serde(rename = "userId")]
    pub external_user_id: String,
    pub medical_record_number: String,
    pub blood_type: Option<BloodType>,
    pub allergies: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_number: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Patient {
    /// Chart number assigned to a freshly bridged patient.
    pub fn new_record_number() -> String {
        format!("MR{}", chrono::Utc::now().timestamp_millis())
    }
}

/// Chart metadata a doctor can set through the profile upsert.
/// `emergency_contact` is stored as JSON text.
#[derive(Debug, Clone, Default)]
pub struct PatientMetadata {
    pub blood_type: Option<BloodType>,
    pub allergies: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_number_has_mr_prefix() {
        let number = Patient::new_record_number();
        assert!(number.starts_with("MR"));
        assert!(number[2..].chars().all(|c| c.is_ascii_digit()));
    }
}
