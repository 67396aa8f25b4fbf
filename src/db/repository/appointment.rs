//! Appointment documents in the directory store.
//!
//! Rows embed the patient and doctor snapshots as JSON text; every
//! read path goes through [`row_to_appointment`], which inflates the
//! snapshots back into typed structs.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::{Appointment, DoctorSnapshot, PatientSnapshot, PaymentStatus};

const APPOINTMENT_COLUMNS: &str = "id, user_id, doc_id, slot_date, slot_time, user_data, doc_data,
        amount, date, cancelled, is_completed, is_confirmed, payment, payment_status, paid_at";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO appointments
            (id, user_id, doc_id, slot_date, slot_time, user_data, doc_data,
             amount, date, cancelled, is_completed, is_confirmed, payment, payment_status, paid_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            appt.id.to_string(),
            appt.user_id,
            appt.doc_id,
            appt.slot_date,
            appt.slot_time,
            serde_json::to_string(&appt.user_data).unwrap_or_default(),
            serde_json::to_string(&appt.doc_data).unwrap_or_default(),
            appt.amount,
            appt.date,
            appt.cancelled,
            appt.is_completed,
            appt.is_confirmed,
            appt.payment,
            appt.payment_status.as_str(),
            appt.paid_at.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id.to_string()], row_to_appointment)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// A doctor's schedule: booking date ascending, then slot time, so the
/// earliest upcoming work sorts first.
pub fn appointments_for_doctor(
    conn: &Connection,
    doc_id: &str,
) -> Result<Vec<Appointment>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE doc_id = ?1
         ORDER BY date ASC, slot_time ASC"
    ))?;
    let rows = stmt.query_map(params![doc_id], row_to_appointment)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

/// A user's own bookings, newest first.
pub fn appointments_for_user(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<Appointment>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE user_id = ?1
         ORDER BY date DESC"
    ))?;
    let rows = stmt.query_map(params![user_id], row_to_appointment)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

/// Every appointment in the system, newest first.
pub fn all_appointments(conn: &Connection) -> Result<Vec<Appointment>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY date DESC"
    ))?;
    let rows = stmt.query_map([], row_to_appointment)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

/// The most recent bookings, for the admin dashboard.
pub fn latest_appointments(conn: &Connection, limit: i64) -> Result<Vec<Appointment>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY date DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], row_to_appointment)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

/// Whether a live (non-cancelled) booking already holds this slot.
pub fn slot_taken(
    conn: &Connection,
    doc_id: &str,
    slot_date: &str,
    slot_time: &str,
) -> Result<bool, StoreError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments
         WHERE doc_id = ?1 AND slot_date = ?2 AND slot_time = ?3 AND cancelled = 0",
        params![doc_id, slot_date, slot_time],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Persist a full status-flag triple on one appointment.
pub fn set_status_flags(
    conn: &Connection,
    id: &Uuid,
    flags: (bool, bool, Option<bool>),
) -> Result<(), StoreError> {
    let (cancelled, is_completed, is_confirmed) = flags;
    let affected = conn.execute(
        "UPDATE appointments SET cancelled = ?2, is_completed = ?3, is_confirmed = ?4
         WHERE id = ?1",
        params![id.to_string(), cancelled, is_completed, is_confirmed],
    )?;
    if affected == 0 {
        return Err(StoreError::NotFound {
            entity: "appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Bookings whose booking instant falls inside `[from, to)` millis.
pub fn count_for_doctor_between(
    conn: &Connection,
    doc_id: &str,
    from_millis: i64,
    to_millis: i64,
) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointments
         WHERE doc_id = ?1 AND date >= ?2 AND date < ?3",
        params![doc_id, from_millis, to_millis],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_distinct_patients_for_doctor(
    conn: &Connection,
    doc_id: &str,
) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(DISTINCT user_id) FROM appointments WHERE doc_id = ?1",
        params![doc_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Neither cancelled nor completed. Confirmed-but-unfinished bookings
/// count as pending work here, matching the dashboard's meaning.
pub fn count_pending_for_doctor(conn: &Connection, doc_id: &str) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointments
         WHERE doc_id = ?1 AND cancelled = 0 AND is_completed = 0",
        params![doc_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_appointments(conn: &Connection) -> Result<i64, StoreError> {
    let count = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
    Ok(count)
}

fn row_to_appointment(row: &rusqlite::Row) -> Result<Appointment, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let user_data: String = row.get(5)?;
    let doc_data: String = row.get(6)?;
    let payment_status: String = row.get(13)?;
    let paid_at: Option<String> = row.get(14)?;

    let json_err = |e: serde_json::Error| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    };

    Ok(Appointment {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        user_id: row.get(1)?,
        doc_id: row.get(2)?,
        slot_date: row.get(3)?,
        slot_time: row.get(4)?,
        user_data: serde_json::from_str::<PatientSnapshot>(&user_data).map_err(json_err)?,
        doc_data: serde_json::from_str::<DoctorSnapshot>(&doc_data).map_err(json_err)?,
        amount: row.get(7)?,
        date: row.get(8)?,
        cancelled: row.get(9)?,
        is_completed: row.get(10)?,
        is_confirmed: row.get(11)?,
        payment: row.get(12)?,
        payment_status: payment_status.parse().unwrap_or(PaymentStatus::Pending),
        paid_at: paid_at
            .and_then(|d| NaiveDateTime::parse_from_str(&d, "%Y-%m-%d %H:%M:%S").ok()),
    })
}
