use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directory-store account that owns bookings. Bridged into the
/// clinical store on first medical-record contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
}
