use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::StoreError;
use crate::models::{LabCategory, LabResult, LabStatus, NewLabResult};

/// Order a lab against an existing record.
pub fn insert_lab_result(
    conn: &Connection,
    medical_record_id: i64,
    new: &NewLabResult,
) -> Result<LabResult, StoreError> {
    conn.execute(
        "INSERT INTO lab_results
            (medical_record_id, test_name, test_category, test_results, normal_range,
             status, lab_technician, ordered_by, notes, file_path)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            medical_record_id,
            new.test_name,
            new.test_category.as_str(),
            new.test_results,
            new.normal_range,
            new.status.as_str(),
            new.lab_technician,
            new.ordered_by,
            new.notes,
            new.file_path,
        ],
    )?;
    let id = conn.last_insert_rowid();
    get_lab_result(conn, id)?.ok_or(StoreError::NotFound {
        entity: "lab_result".into(),
        id: id.to_string(),
    })
}

pub fn get_lab_result(conn: &Connection, id: i64) -> Result<Option<LabResult>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, medical_record_id, test_name, test_category, test_results, normal_range,
                status, lab_technician, ordered_by, ordered_date, completed_date, notes, file_path
         FROM lab_results WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], row_to_lab_result)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// All labs attached to a record, oldest first.
pub fn lab_results_for_record(
    conn: &Connection,
    medical_record_id: i64,
) -> Result<Vec<LabResult>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, medical_record_id, test_name, test_category, test_results, normal_range,
                status, lab_technician, ordered_by, ordered_date, completed_date, notes, file_path
         FROM lab_results WHERE medical_record_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![medical_record_id], row_to_lab_result)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

fn row_to_lab_result(row: &rusqlite::Row) -> Result<LabResult, rusqlite::Error> {
    let category: String = row.get(3)?;
    let status: String = row.get(6)?;
    let ordered_str: String = row.get(9)?;
    let completed_str: Option<String> = row.get(10)?;

    Ok(LabResult {
        id: row.get(0)?,
        medical_record_id: row.get(1)?,
        test_name: row.get(2)?,
        test_category: category.parse().unwrap_or(LabCategory::Other),
        test_results: row.get(4)?,
        normal_range: row.get(5)?,
        status: status.parse().unwrap_or(LabStatus::Pending),
        lab_technician: row.get(7)?,
        ordered_by: row.get(8)?,
        ordered_date: NaiveDateTime::parse_from_str(&ordered_str, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
        completed_date: completed_str
            .and_then(|d| NaiveDateTime::parse_from_str(&d, "%Y-%m-%d %H:%M:%S").ok()),
        notes: row.get(11)?,
        file_path: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::clinical::open_memory_clinical_store;
    use crate::db::repository::medical_record::insert_medical_record;
    use crate::db::repository::patient::find_or_create_patient;
    use crate::models::{NewMedicalRecord, VisitType};

    fn seed_record(conn: &Connection) -> i64 {
        let patient = find_or_create_patient(conn, "user-1").unwrap();
        insert_medical_record(
            conn,
            patient.id,
            &NewMedicalRecord {
                doctor_id: "doc-1".into(),
                appointment_id: None,
                visit_date: NaiveDateTime::parse_from_str(
                    "2025-03-14 09:30:00",
                    "%Y-%m-%d %H:%M:%S",
                )
                .unwrap(),
                visit_type: VisitType::Consultation,
                chief_complaint: None,
                diagnosis: None,
                treatment: None,
                notes: None,
                follow_up_required: false,
                follow_up_date: None,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn insert_defaults_to_pending() {
        let conn = open_memory_clinical_store().unwrap();
        let record_id = seed_record(&conn);

        let lab = insert_lab_result(
            &conn,
            record_id,
            &NewLabResult {
                test_name: "CBC".into(),
                test_category: LabCategory::Blood,
                test_results: None,
                normal_range: None,
                status: LabStatus::Pending,
                lab_technician: None,
                ordered_by: "doc-1".into(),
                notes: None,
                file_path: None,
            },
        )
        .unwrap();

        assert_eq!(lab.status, LabStatus::Pending);
        assert_eq!(lab.test_category, LabCategory::Blood);
        assert!(lab.completed_date.is_none());
    }

    #[test]
    fn structured_results_round_trip() {
        let conn = open_memory_clinical_store().unwrap();
        let record_id = seed_record(&conn);

        insert_lab_result(
            &conn,
            record_id,
            &NewLabResult {
                test_name: "HbA1c".into(),
                test_category: LabCategory::Blood,
                test_results: Some(r#"{"value":6.1,"unit":"%"}"#.into()),
                normal_range: Some("4.0-5.6".into()),
                status: LabStatus::Abnormal,
                lab_technician: Some("T. Okafor".into()),
                ordered_by: "doc-1".into(),
                notes: Some("fasting sample".into()),
                file_path: None,
            },
        )
        .unwrap();

        let labs = lab_results_for_record(&conn, record_id).unwrap();
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].status, LabStatus::Abnormal);
        assert_eq!(labs[0].normal_range.as_deref(), Some("4.0-5.6"));
        assert!(labs[0].test_results.as_deref().unwrap().contains("6.1"));
    }

    #[test]
    fn dangling_record_id_is_rejected() {
        let conn = open_memory_clinical_store().unwrap();
        let result = insert_lab_result(
            &conn,
            999,
            &NewLabResult {
                test_name: "CBC".into(),
                test_category: LabCategory::Blood,
                test_results: None,
                normal_range: None,
                status: LabStatus::Pending,
                lab_technician: None,
                ordered_by: "doc-1".into(),
                notes: None,
                file_path: None,
            },
        );
        assert!(result.is_err());
    }
}
