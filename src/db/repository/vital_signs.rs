use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::StoreError;
use crate::models::{compute_bmi, NewVitalSigns, VitalSigns};

/// Record a vitals panel against an existing record. BMI is derived
/// from weight and height here, at write time, and stored as-is.
pub fn insert_vital_signs(
    conn: &Connection,
    medical_record_id: i64,
    new: &NewVitalSigns,
) -> Result<VitalSigns, StoreError> {
    let bmi = compute_bmi(new.weight, new.height);
    conn.execute(
        "INSERT INTO vital_signs
            (medical_record_id, blood_pressure_systolic, blood_pressure_diastolic,
             heart_rate, temperature, respiratory_rate, oxygen_saturation,
             weight, height, bmi, recorded_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            medical_record_id,
            new.blood_pressure_systolic,
            new.blood_pressure_diastolic,
            new.heart_rate,
            new.temperature,
            new.respiratory_rate,
            new.oxygen_saturation,
            new.weight,
            new.height,
            bmi,
            new.recorded_by,
        ],
    )?;
    let id = conn.last_insert_rowid();
    get_vital_signs(conn, id)?.ok_or(StoreError::NotFound {
        entity: "vital_signs".into(),
        id: id.to_string(),
    })
}

pub fn get_vital_signs(conn: &Connection, id: i64) -> Result<Option<VitalSigns>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, medical_record_id, blood_pressure_systolic, blood_pressure_diastolic,
                heart_rate, temperature, respiratory_rate, oxygen_saturation,
                weight, height, bmi, recorded_by, recorded_at
         FROM vital_signs WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], row_to_vital_signs)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// All vitals panels attached to a record, oldest first.
pub fn vital_signs_for_record(
    conn: &Connection,
    medical_record_id: i64,
) -> Result<Vec<VitalSigns>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, medical_record_id, blood_pressure_systolic, blood_pressure_diastolic,
                heart_rate, temperature, respiratory_rate, oxygen_saturation,
                weight, height, bmi, recorded_by, recorded_at
         FROM vital_signs WHERE medical_record_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![medical_record_id], row_to_vital_signs)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

fn row_to_vital_signs(row: &rusqlite::Row) -> Result<VitalSigns, rusqlite::Error> {
    let recorded_str: String = row.get(12)?;

    Ok(VitalSigns {
        id: row.get(0)?,
        medical_record_id: row.get(1)?,
        blood_pressure_systolic: row.get(2)?,
        blood_pressure_diastolic: row.get(3)?,
        heart_rate: row.get(4)?,
        temperature: row.get(5)?,
        respiratory_rate: row.get(6)?,
        oxygen_saturation: row.get(7)?,
        weight: row.get(8)?,
        height: row.get(9)?,
        bmi: row.get(10)?,
        recorded_by: row.get(11)?,
        recorded_at: NaiveDateTime::parse_from_str(&recorded_str, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
    })
}
