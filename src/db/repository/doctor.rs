use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::{Doctor, DoctorProfileUpdate};

const DOCTOR_COLUMNS: &str = "id, name, email, password_hash, speciality, degree, experience,
        about, fees, address, available, image_url";

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO doctors
            (id, name, email, password_hash, speciality, degree, experience,
             about, fees, address, available, image_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.email,
            doctor.password_hash,
            doctor.speciality,
            doctor.degree,
            doctor.experience,
            doctor.about,
            doctor.fees,
            doctor.address,
            doctor.available,
            doctor.image_url,
        ],
    )?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, StoreError> {
    let mut stmt = conn.prepare(&format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id.to_string()], row_to_doctor)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn find_doctor_by_email(conn: &Connection, email: &str) -> Result<Option<Doctor>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE email = ?1"
    ))?;
    let mut rows = stmt.query_map(params![email], row_to_doctor)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, StoreError> {
    let mut stmt = conn.prepare(&format!("SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY name"))?;
    let rows = stmt.query_map([], row_to_doctor)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

pub fn count_doctors(conn: &Connection) -> Result<i64, StoreError> {
    let count = conn.query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))?;
    Ok(count)
}

pub fn set_doctor_availability(
    conn: &Connection,
    id: &Uuid,
    available: bool,
) -> Result<(), StoreError> {
    let affected = conn.execute(
        "UPDATE doctors SET available = ?2 WHERE id = ?1",
        params![id.to_string(), available],
    )?;
    if affected == 0 {
        return Err(StoreError::NotFound {
            entity: "doctor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Partial profile update; absent fields keep their stored values.
pub fn update_doctor_profile(
    conn: &Connection,
    id: &Uuid,
    update: &DoctorProfileUpdate,
) -> Result<Doctor, StoreError> {
    let affected = conn.execute(
        "UPDATE doctors SET
            name = COALESCE(?2, name),
            speciality = COALESCE(?3, speciality),
            experience = COALESCE(?4, experience),
            fees = COALESCE(?5, fees),
            about = COALESCE(?6, about),
            address = COALESCE(?7, address)
         WHERE id = ?1",
        params![
            id.to_string(),
            update.name,
            update.speciality,
            update.experience,
            update.fees,
            update.about,
            update.address,
        ],
    )?;
    if affected == 0 {
        return Err(StoreError::NotFound {
            entity: "doctor".into(),
            id: id.to_string(),
        });
    }
    get_doctor(conn, id)?.ok_or(StoreError::NotFound {
        entity: "doctor".into(),
        id: id.to_string(),
    })
}

fn row_to_doctor(row: &rusqlite::Row) -> Result<Doctor, rusqlite::Error> {
    let id_str: String = row.get(0)?;

    Ok(Doctor {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        speciality: row.get(4)?,
        degree: row.get(5)?,
        experience: row.get(6)?,
        about: row.get(7)?,
        fees: row.get(8)?,
        address: row.get(9)?,
        available: row.get(10)?,
        image_url: row.get(11)?,
    })
}
