//! Repository layer — entity-scoped database operations.
//!
//! Clinical-store modules (patient, medical_record, prescription,
//! vital_signs, lab_result) and directory-store modules (user, doctor,
//! appointment, token) are kept separate; a connection from one store
//! must never be handed to the other side's functions.

mod appointment;
mod doctor;
mod lab_result;
mod medical_record;
mod patient;
mod prescription;
mod token;
mod user;
mod vital_signs;

pub use appointment::*;
pub use doctor::*;
pub use lab_result::*;
pub use medical_record::*;
pub use patient::*;
pub use prescription::*;
pub use token::*;
pub use user::*;
pub use vital_signs::*;
