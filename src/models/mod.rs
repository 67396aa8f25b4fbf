pub mod appointment;
pub mod doctor;
pub mod enums;
pub mod lab_result;
pub mod medical_record;
pub mod patient;
pub mod prescription;
pub mod user;
pub mod vital_signs;

pub use appointment::*;
pub use doctor::*;
pub use enums::*;
pub use lab_result::*;
pub use medical_record::*;
pub use patient::*;
pub use prescription::*;
pub use user::*;
pub use vital_signs::*;
