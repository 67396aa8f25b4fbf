//! Doctor-facing endpoints.
//!
//! Public:
//! - `GET  /api/doctor/list` — directory listing without credentials
//! - `POST /api/doctor/login`
//!
//! Behind the doctor guard:
//! - `GET  /api/doctor/dashboard`
//! - `GET  /api/doctor/appointments`
//! - `GET  /api/doctor/patients`
//! - `GET/PUT /api/doctor/profile`
//! - `POST /api/doctor/toggle-availability`
//! - `POST /api/doctor/update-appointment`

use axum::extract::State;
use axum::{Extension, Json};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::{transition_flags, TokenResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext, MessageResponse};
use crate::auth;
use crate::db;
use crate::models::{
    Appointment, AppointmentStatus, Doctor, DoctorProfileUpdate, PaymentStatus, Role,
};
use crate::roster::{build_roster, PatientSummary};

/// A doctor as the wire shows it. Credentials never leave the db
/// layer; `email` is additionally dropped from the public listing.
#[derive(Serialize)]
pub struct DoctorView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: f64,
    pub address: serde_json::Value,
    pub available: bool,
    pub image: Option<String>,
}

impl DoctorView {
    /// Listing shape: no password, no email.
    pub(crate) fn public(doctor: Doctor) -> Self {
        Self::build(doctor, false)
    }

    /// Profile shape: no password, email kept.
    pub(crate) fn profile(doctor: Doctor) -> Self {
        Self::build(doctor, true)
    }

    fn build(doctor: Doctor, with_email: bool) -> Self {
        // Address is stored as JSON text; fall back to a plain string
        // for rows that predate that convention.
        let address = serde_json::from_str(&doctor.address)
            .unwrap_or_else(|_| serde_json::Value::String(doctor.address.clone()));
        Self {
            id: doctor.id.to_string(),
            name: doctor.name,
            email: with_email.then_some(doctor.email),
            speciality: doctor.speciality,
            degree: doctor.degree,
            experience: doctor.experience,
            about: doctor.about,
            fees: doctor.fees,
            address,
            available: doctor.available,
            image: doctor.image_url,
        }
    }
}

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub success: bool,
    pub doctors: Vec<DoctorView>,
}

/// `GET /api/doctor/list` — public directory listing.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<DoctorsResponse>, ApiError> {
    let directory = ctx.state.directory()?;
    let doctors = db::list_doctors(&directory)?
        .into_iter()
        .map(DoctorView::public)
        .collect();
    Ok(Json(DoctorsResponse {
        success: true,
        doctors,
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /api/doctor/login` — credential check, fresh token.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let directory = ctx.state.directory()?;
    let doctor = db::find_doctor_by_email(&directory, req.email.trim())?
        .ok_or(ApiError::InvalidCredentials)?;
    if !auth::verify_password(&req.password, &doctor.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }
    let token = auth::issue_token(&directory, &Role::Doctor, &doctor.id.to_string())?;
    Ok(Json(TokenResponse::new(token)))
}

/// Principal ids are the uuids we minted at account creation; one
/// that no longer parses means the token is stale.
fn doctor_uuid(doctor: &DoctorContext) -> Result<Uuid, ApiError> {
    Uuid::parse_str(&doctor.doctor_id).map_err(|_| ApiError::Unauthorized)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub today_appointments: i64,
    pub total_patients: i64,
    pub pending_appointments: i64,
    pub available: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub success: bool,
    pub dashboard_data: DashboardData,
}

/// The current local day as a half-open epoch-millis window.
fn today_window_millis() -> (i64, i64) {
    let now = chrono::Local::now();
    let since_midnight = now.naive_local() - now.date_naive().and_time(chrono::NaiveTime::MIN);
    let start = now.timestamp_millis() - since_midnight.num_milliseconds();
    (start, start + 86_400_000)
}

/// `GET /api/doctor/dashboard` — today's load, patient and pending
/// counts, own availability. Each figure is its own filter; none are
/// derived from the roster.
pub async fn dashboard(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let id = doctor_uuid(&doctor)?;
    let (today_start, today_end) = today_window_millis();

    let directory = ctx.state.directory()?;
    let today_appointments =
        db::count_for_doctor_between(&directory, &doctor.doctor_id, today_start, today_end)?;
    let total_patients = db::count_distinct_patients_for_doctor(&directory, &doctor.doctor_id)?;
    let pending_appointments = db::count_pending_for_doctor(&directory, &doctor.doctor_id)?;
    let available = db::get_doctor(&directory, &id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?
        .available;

    Ok(Json(DashboardResponse {
        success: true,
        dashboard_data: DashboardData {
            today_appointments,
            total_patients,
            pending_appointments,
            available,
        },
    }))
}

/// One row of the doctor's appointment table: slot and patient
/// snapshot fields pulled up top, raw flags kept alongside the
/// projected status.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRow {
    #[serde(rename = "_id")]
    pub id: String,
    pub patient_name: String,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    pub date: String,
    pub time: String,
    pub speciality: String,
    pub status: AppointmentStatus,
    pub fees: f64,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<NaiveDateTime>,
    pub is_completed: bool,
    pub cancelled: bool,
    pub is_confirmed: Option<bool>,
}

impl From<Appointment> for AppointmentRow {
    fn from(appt: Appointment) -> Self {
        let status = appt.status();
        Self {
            id: appt.id.to_string(),
            patient_name: appt.user_data.name,
            patient_email: appt.user_data.email,
            patient_phone: appt.user_data.phone,
            date: appt.slot_date,
            time: appt.slot_time,
            speciality: appt.doc_data.speciality,
            status,
            fees: appt.amount,
            payment_status: appt.payment_status,
            paid_at: appt.paid_at,
            is_completed: appt.is_completed,
            cancelled: appt.cancelled,
            is_confirmed: appt.is_confirmed,
        }
    }
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub success: bool,
    pub appointments: Vec<AppointmentRow>,
}

/// `GET /api/doctor/appointments` — own schedule, soonest slot first.
pub async fn appointments(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let directory = ctx.state.directory()?;
    let appointments = db::appointments_for_doctor(&directory, &doctor.doctor_id)?
        .into_iter()
        .map(AppointmentRow::from)
        .collect();
    Ok(Json(AppointmentsResponse {
        success: true,
        appointments,
    }))
}

#[derive(Serialize)]
pub struct PatientsResponse {
    pub success: bool,
    pub patients: Vec<PatientSummary>,
}

/// `GET /api/doctor/patients` — everyone who ever booked with this
/// doctor, grouped from the appointment snapshots.
pub async fn patients(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<PatientsResponse>, ApiError> {
    let directory = ctx.state.directory()?;
    let appointments = db::appointments_for_doctor(&directory, &doctor.doctor_id)?;
    Ok(Json(PatientsResponse {
        success: true,
        patients: build_roster(&appointments),
    }))
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub profile: DoctorView,
}

/// `GET /api/doctor/profile` — own profile without the password.
pub async fn profile(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let id = doctor_uuid(&doctor)?;
    let directory = ctx.state.directory()?;
    let row = db::get_doctor(&directory, &id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    Ok(Json(ProfileResponse {
        success: true,
        message: None,
        profile: DoctorView::profile(row),
    }))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub speciality: Option<String>,
    pub experience: Option<String>,
    pub fees: Option<f64>,
    pub about: Option<String>,
    pub address: Option<serde_json::Value>,
}

/// `PUT /api/doctor/profile` — partial update of the own profile.
pub async fn update_profile(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let id = doctor_uuid(&doctor)?;
    let address = match req.address {
        Some(value) => {
            Some(serde_json::to_string(&value).map_err(|e| ApiError::Internal(e.to_string()))?)
        }
        None => None,
    };
    let update = DoctorProfileUpdate {
        name: req.name,
        speciality: req.speciality,
        experience: req.experience,
        fees: req.fees,
        about: req.about,
        address,
    };

    let directory = ctx.state.directory()?;
    let row = db::update_doctor_profile(&directory, &id, &update)?;
    Ok(Json(ProfileResponse {
        success: true,
        message: Some("Profile updated successfully".into()),
        profile: DoctorView::profile(row),
    }))
}

/// `POST /api/doctor/toggle-availability` — flip the own flag.
pub async fn toggle_availability(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = doctor_uuid(&doctor)?;
    let directory = ctx.state.directory()?;
    let row = db::get_doctor(&directory, &id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    let enabled = !row.available;
    db::set_doctor_availability(&directory, &id, enabled)?;
    let message = format!(
        "Availability {} successfully",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(Json(MessageResponse::ok(message)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    #[serde(default)]
    pub appointment_id: String,
    #[serde(default)]
    pub status: String,
}

/// `POST /api/doctor/update-appointment` — move one of the own
/// appointments to a new status.
///
/// Scoped to the caller's appointments: someone else's id reads as
/// not found, same as a nonexistent one.
pub async fn update_appointment(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target: AppointmentStatus = req.status.parse().map_err(ApiError::from)?;
    let id = Uuid::parse_str(&req.appointment_id)
        .map_err(|_| ApiError::NotFound("Appointment not found".into()))?;

    let directory = ctx.state.directory()?;
    let appointment = db::get_appointment(&directory, &id)?
        .filter(|a| a.doc_id == doctor.doctor_id)
        .ok_or_else(|| ApiError::NotFound("Appointment not found".into()))?;
    let flags = transition_flags(appointment.status(), target)?;
    db::set_status_flags(&directory, &id, flags)?;

    Ok(Json(MessageResponse::ok(
        "Appointment status updated successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doctor() -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            name: "Dr. Patel".into(),
            email: "patel@clinic.example".into(),
            password_hash: "$pbkdf2-sha256$secret".into(),
            speciality: "Cardiology".into(),
            degree: "MD".into(),
            experience: "8 years".into(),
            about: "Cardiologist.".into(),
            fees: 120.0,
            address: r#"{"line1":"12 Harley St","line2":"London"}"#.into(),
            available: true,
            image_url: None,
        }
    }

    #[test]
    fn public_view_hides_email_and_password() {
        let value = serde_json::to_value(DoctorView::public(sample_doctor())).unwrap();
        assert!(value.get("email").is_none());
        assert!(value.get("password").is_none());
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["name"], "Dr. Patel");
        assert!(value["_id"].is_string());
    }

    #[test]
    fn profile_view_keeps_email() {
        let value = serde_json::to_value(DoctorView::profile(sample_doctor())).unwrap();
        assert_eq!(value["email"], "patel@clinic.example");
        assert!(value.get("password").is_none());
    }

    #[test]
    fn address_json_text_becomes_an_object() {
        let value = serde_json::to_value(DoctorView::public(sample_doctor())).unwrap();
        assert_eq!(value["address"]["line1"], "12 Harley St");
    }

    #[test]
    fn plain_text_address_survives_as_a_string() {
        let mut doctor = sample_doctor();
        doctor.address = "12 Harley St, London".into();
        let value = serde_json::to_value(DoctorView::public(doctor)).unwrap();
        assert_eq!(value["address"], "12 Harley St, London");
    }

    #[test]
    fn appointment_row_flattens_the_snapshot() {
        let appt = Appointment {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            doc_id: "d1".into(),
            slot_date: "2025-06-01".into(),
            slot_time: "10:00".into(),
            user_data: crate::models::PatientSnapshot {
                name: "Jane Roe".into(),
                email: Some("jane@example.com".into()),
                phone: Some("555-0100".into()),
                date_of_birth: None,
            },
            doc_data: crate::models::DoctorSnapshot {
                name: "Dr. Patel".into(),
                speciality: "Cardiology".into(),
                fees: 120.0,
            },
            amount: 120.0,
            date: 1_748_770_000_000,
            cancelled: false,
            is_completed: false,
            is_confirmed: Some(true),
            payment: false,
            payment_status: PaymentStatus::Pending,
            paid_at: None,
        };
        let value = serde_json::to_value(AppointmentRow::from(appt)).unwrap();
        assert_eq!(value["patientName"], "Jane Roe");
        assert_eq!(value["date"], "2025-06-01");
        assert_eq!(value["time"], "10:00");
        assert_eq!(value["status"], "confirmed");
        assert_eq!(value["fees"], 120.0);
        assert_eq!(value["paymentStatus"], "pending");
    }

    #[test]
    fn today_window_is_one_day_wide() {
        let (start, end) = today_window_millis();
        assert_eq!(end - start, 86_400_000);
        let now = chrono::Utc::now().timestamp_millis();
        assert!(start <= now && now < end);
    }
}
