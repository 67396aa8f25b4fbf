use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::StoreError;
use crate::models::{NewPrescription, Prescription, PrescriptionStatus};

/// Prescribe against an existing record. The caller is responsible
/// for checking the record exists first; a dangling id trips the
/// foreign key.
pub fn insert_prescription(
    conn: &Connection,
    medical_record_id: i64,
    new: &NewPrescription,
) -> Result<Prescription, StoreError> {
    conn.execute(
        "INSERT INTO prescriptions
            (medical_record_id, medication_name, dosage, frequency, duration,
             instructions, quantity, refills)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            medical_record_id,
            new.medication_name,
            new.dosage,
            new.frequency,
            new.duration,
            new.instructions,
            new.quantity,
            new.refills,
        ],
    )?;
    let id = conn.last_insert_rowid();
    get_prescription(conn, id)?.ok_or(StoreError::NotFound {
        entity: "prescription".into(),
        id: id.to_string(),
    })
}

pub fn get_prescription(conn: &Connection, id: i64) -> Result<Option<Prescription>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, medical_record_id, medication_name, dosage, frequency, duration,
                instructions, quantity, refills, status, prescribed_date, created_at
         FROM prescriptions WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], row_to_prescription)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// All prescriptions attached to a record, oldest first.
pub fn prescriptions_for_record(
    conn: &Connection,
    medical_record_id: i64,
) -> Result<Vec<Prescription>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, medical_record_id, medication_name, dosage, frequency, duration,
                instructions, quantity, refills, status, prescribed_date, created_at
         FROM prescriptions WHERE medical_record_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![medical_record_id], row_to_prescription)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

fn row_to_prescription(row: &rusqlite::Row) -> Result<Prescription, rusqlite::Error> {
    let status: String = row.get(9)?;
    let prescribed_str: String = row.get(10)?;
    let created_str: String = row.get(11)?;

    Ok(Prescription {
        id: row.get(0)?,
        medical_record_id: row.get(1)?,
        medication_name: row.get(2)?,
        dosage: row.get(3)?,
        frequency: row.get(4)?,
        duration: row.get(5)?,
        instructions: row.get(6)?,
        quantity: row.get(7)?,
        refills: row.get(8)?,
        status: status.parse().unwrap_or(PrescriptionStatus::Active),
        prescribed_date: NaiveDateTime::parse_from_str(&prescribed_str, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
        created_at: NaiveDateTime::parse_from_str(&created_str, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
    })
}
