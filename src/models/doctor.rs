use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directory-store doctor. `address` is JSON text (line1/line2 in the
/// original documents); `password_hash` never leaves the db layer
/// unredacted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: f64,
    pub address: String,
    pub available: bool,
    pub image_url: Option<String>,
}

/// Partial profile update: `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct DoctorProfileUpdate {
    pub name: Option<String>,
    pub speciality: Option<String>,
    pub experience: Option<String>,
    pub fees: Option<f64>,
    pub about: Option<String>,
    pub address: Option<String>,
}
