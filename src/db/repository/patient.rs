//! Patient charts and the identity bridge.
//!
//! Clinical rows are keyed by a surrogate id; the bridge ties them to
//! directory users through the unique `external_user_id` column.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::StoreError;
use crate::models::{Patient, PatientMetadata};

/// Look a patient up by their directory user id.
pub fn find_patient_by_external_id(
    conn: &Connection,
    external_user_id: &str,
) -> Result<Option<Patient>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, external_user_id, medical_record_number, blood_type, allergies,
                emergency_contact, medical_history, insurance_provider, insurance_number,
                created_at, updated_at
         FROM patients WHERE external_user_id = ?1",
    )?;
    let mut rows = stmt.query_map(params![external_user_id], row_to_patient)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, external_user_id, medical_record_number, blood_type, allergies,
                emergency_contact, medical_history, insurance_provider, insurance_number,
                created_at, updated_at
         FROM patients WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], row_to_patient)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Insert a bare chart for a directory user. Fails on a duplicate
/// `external_user_id`.
pub fn insert_patient(conn: &Connection, external_user_id: &str) -> Result<Patient, StoreError> {
    let record_number = Patient::new_record_number();
    conn.execute(
        "INSERT INTO patients (external_user_id, medical_record_number) VALUES (?1, ?2)",
        params![external_user_id, record_number],
    )?;
    let id = conn.last_insert_rowid();
    get_patient(conn, id)?.ok_or(StoreError::NotFound {
        entity: "patient".into(),
        id: id.to_string(),
    })
}

/// The identity bridge: return the chart for a directory user,
/// creating it on first contact. Idempotent.
///
/// Two concurrent first calls race on the insert; the loser hits the
/// UNIQUE constraint and retries the lookup once, so exactly one row
/// survives either way.
pub fn find_or_create_patient(
    conn: &Connection,
    external_user_id: &str,
) -> Result<Patient, StoreError> {
    if let Some(patient) = find_patient_by_external_id(conn, external_user_id)? {
        return Ok(patient);
    }

    match insert_patient(conn, external_user_id) {
        Ok(patient) => Ok(patient),
        Err(err) if err.is_unique_violation() => {
            find_patient_by_external_id(conn, external_user_id)?.ok_or_else(|| {
                StoreError::ConstraintViolation(format!(
                    "patient row for {external_user_id} vanished after insert race"
                ))
            })
        }
        Err(err) => Err(err),
    }
}

/// Overwrite the chart metadata set through the profile upsert.
pub fn update_patient_metadata(
    conn: &Connection,
    id: i64,
    meta: &PatientMetadata,
) -> Result<(), StoreError> {
    let affected = conn.execute(
        "UPDATE patients SET
            blood_type = ?2, allergies = ?3, emergency_contact = ?4,
            medical_history = ?5, insurance_provider = ?6, insurance_number = ?7,
            updated_at = datetime('now')
         WHERE id = ?1",
        params![
            id,
            meta.blood_type.as_ref().map(|b| b.as_str()),
            meta.allergies,
            meta.emergency_contact,
            meta.medical_history,
            meta.insurance_provider,
            meta.insurance_number,
        ],
    )?;
    if affected == 0 {
        return Err(StoreError::NotFound {
            entity: "patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn row_to_patient(row: &rusqlite::Row) -> Result<Patient, rusqlite::Error> {
    let blood_type: Option<String> = row.get(3)?;
    let created_str: String = row.get(9)?;
    let updated_str: String = row.get(10)?;

    Ok(Patient {
        id: row.get(0)?,
        external_user_id: row.get(1)?,
        medical_record_number: row.get(2)?,
        blood_type: blood_type.and_then(|s| s.parse().ok()),
        allergies: row.get(4)?,
        emergency_contact: row.get(5)?,
        medical_history: row.get(6)?,
        insurance_provider: row.get(7)?,
        insurance_number: row.get(8)?,
        created_at: NaiveDateTime::parse_from_str(&created_str, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
        updated_at: NaiveDateTime::parse_from_str(&updated_str, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
    })
}
