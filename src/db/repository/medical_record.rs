use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};

use crate::db::StoreError;
use crate::models::{MedicalRecord, MedicalRecordUpdate, NewMedicalRecord, RecordStatus, VisitType};

const RECORD_COLUMNS: &str = "id, patient_id, doctor_id, appointment_id, visit_date, visit_type,
        chief_complaint, diagnosis, treatment, notes, follow_up_required, follow_up_date,
        status, created_at, updated_at";

/// Open a new record in a patient's chart.
pub fn insert_medical_record(
    conn: &Connection,
    patient_id: i64,
    new: &NewMedicalRecord,
) -> Result<MedicalRecord, StoreError> {
    conn.execute(
        "INSERT INTO medical_records
            (patient_id, doctor_id, appointment_id, visit_date, visit_type,
             chief_complaint, diagnosis, treatment, notes, follow_up_required, follow_up_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            patient_id,
            new.doctor_id,
            new.appointment_id,
            new.visit_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            new.visit_type.as_str(),
            new.chief_complaint,
            new.diagnosis,
            new.treatment,
            new.notes,
            new.follow_up_required,
            new.follow_up_date.map(|d| d.to_string()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    get_medical_record(conn, id)?.ok_or(StoreError::NotFound {
        entity: "medical_record".into(),
        id: id.to_string(),
    })
}

pub fn get_medical_record(
    conn: &Connection,
    id: i64,
) -> Result<Option<MedicalRecord>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id], row_to_medical_record)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Partial update by record id. Absent fields keep their stored
/// values; zero affected rows means the record does not exist.
pub fn update_medical_record(
    conn: &Connection,
    id: i64,
    update: &MedicalRecordUpdate,
) -> Result<MedicalRecord, StoreError> {
    let affected = conn.execute(
        "UPDATE medical_records SET
            visit_date = COALESCE(?2, visit_date),
            visit_type = COALESCE(?3, visit_type),
            chief_complaint = COALESCE(?4, chief_complaint),
            diagnosis = COALESCE(?5, diagnosis),
            treatment = COALESCE(?6, treatment),
            notes = COALESCE(?7, notes),
            follow_up_required = COALESCE(?8, follow_up_required),
            follow_up_date = COALESCE(?9, follow_up_date),
            status = COALESCE(?10, status),
            updated_at = datetime('now')
         WHERE id = ?1",
        params![
            id,
            update
                .visit_date
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
            update.visit_type.as_ref().map(|v| v.as_str()),
            update.chief_complaint,
            update.diagnosis,
            update.treatment,
            update.notes,
            update.follow_up_required,
            update.follow_up_date.map(|d| d.to_string()),
            update.status.as_ref().map(|s| s.as_str()),
        ],
    )?;
    if affected == 0 {
        return Err(StoreError::NotFound {
            entity: "medical_record".into(),
            id: id.to_string(),
        });
    }
    get_medical_record(conn, id)?.ok_or(StoreError::NotFound {
        entity: "medical_record".into(),
        id: id.to_string(),
    })
}

/// One page of a patient's history, newest visit first.
pub fn list_patient_records(
    conn: &Connection,
    patient_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<MedicalRecord>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records
         WHERE patient_id = ?1
         ORDER BY visit_date DESC
         LIMIT ?2 OFFSET ?3"
    ))?;
    let rows = stmt.query_map(params![patient_id, limit, offset], row_to_medical_record)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

pub fn count_patient_records(conn: &Connection, patient_id: i64) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM medical_records WHERE patient_id = ?1",
        params![patient_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn row_to_medical_record(row: &rusqlite::Row) -> Result<MedicalRecord, rusqlite::Error> {
    let visit_date: String = row.get(4)?;
    let visit_type: String = row.get(5)?;
    let follow_up_date: Option<String> = row.get(11)?;
    let status: String = row.get(12)?;
    let created_str: String = row.get(13)?;
    let updated_str: String = row.get(14)?;

    Ok(MedicalRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        appointment_id: row.get(3)?,
        visit_date: NaiveDateTime::parse_from_str(&visit_date, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
        visit_type: visit_type.parse().unwrap_or(VisitType::Consultation),
        chief_complaint: row.get(6)?,
        diagnosis: row.get(7)?,
        treatment: row.get(8)?,
        notes: row.get(9)?,
        follow_up_required: row.get(10)?,
        follow_up_date: follow_up_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        status: status.parse().unwrap_or(RecordStatus::Active),
        created_at: NaiveDateTime::parse_from_str(&created_str, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
        updated_at: NaiveDateTime::parse_from_str(&updated_str, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
    })
}
