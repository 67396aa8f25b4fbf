//! Admin endpoints.
//!
//! Admin is not an account in the directory: it is a single
//! credential pair from the environment, checked at login. Everything
//! else rides the same bearer-token machinery with the admin role.
//!
//! - `POST /api/admin/login`
//! - `POST /api/admin/add-doctor`
//! - `GET  /api/admin/doctors`
//! - `POST /api/admin/change-availability`
//! - `GET  /api/admin/appointments`
//! - `POST /api/admin/cancel-appointment`
//! - `GET  /api/admin/dashboard`

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::doctor::DoctorView;
use crate::api::endpoints::user::{valid_email, MIN_PASSWORD_LEN, WEAK_PASSWORD_MESSAGE};
use crate::api::endpoints::{transition_flags, AppointmentView, TokenResponse};
use crate::api::error::ApiError;
use crate::api::types::{AdminContext, ApiContext, MessageResponse};
use crate::auth;
use crate::db;
use crate::models::{AppointmentStatus, Doctor, Role};

/// Principal id recorded against admin tokens.
const ADMIN_PRINCIPAL: &str = "admin";

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /api/admin/login` — check against the environment-provided
/// credentials. With none configured, admin login is disabled and
/// every attempt fails the same way.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let creds = ctx
        .state
        .admin
        .as_ref()
        .ok_or(ApiError::InvalidCredentials)?;
    if req.email != creds.email || req.password != creds.password {
        return Err(ApiError::InvalidCredentials);
    }
    let directory = ctx.state.directory()?;
    let token = auth::issue_token(&directory, &Role::Admin, ADMIN_PRINCIPAL)?;
    Ok(Json(TokenResponse::new(token)))
}

#[derive(Deserialize)]
pub struct AddDoctorRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub speciality: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub about: String,
    pub fees: Option<f64>,
    pub address: Option<serde_json::Value>,
}

/// `POST /api/admin/add-doctor` — create a doctor account.
pub async fn add_doctor(
    State(ctx): State<ApiContext>,
    Extension(_admin): Extension<AdminContext>,
    Json(req): Json<AddDoctorRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (Some(fees), Some(address)) = (req.fees, req.address) else {
        return Err(ApiError::Validation("Missing details".into()));
    };
    if req.name.trim().is_empty()
        || req.email.trim().is_empty()
        || req.password.is_empty()
        || req.speciality.trim().is_empty()
        || req.degree.trim().is_empty()
        || req.experience.trim().is_empty()
        || req.about.trim().is_empty()
    {
        return Err(ApiError::Validation("Missing details".into()));
    }
    let email = req.email.trim();
    if !valid_email(email) {
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(WEAK_PASSWORD_MESSAGE.into()));
    }
    let address =
        serde_json::to_string(&address).map_err(|e| ApiError::Internal(e.to_string()))?;
    let password_hash = auth::hash_password(&req.password)?;

    let doctor = Doctor {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        email: email.to_string(),
        password_hash,
        speciality: req.speciality,
        degree: req.degree,
        experience: req.experience,
        about: req.about,
        fees,
        address,
        available: true,
        image_url: None,
    };

    let directory = ctx.state.directory()?;
    if db::find_doctor_by_email(&directory, &doctor.email)?.is_some() {
        return Err(ApiError::Validation("Doctor already exists".into()));
    }
    db::insert_doctor(&directory, &doctor)?;

    Ok(Json(MessageResponse::ok("Doctor added successfully")))
}

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub success: bool,
    pub doctors: Vec<DoctorView>,
}

/// `GET /api/admin/doctors` — every doctor, email included, password
/// never.
pub async fn doctors(
    State(ctx): State<ApiContext>,
    Extension(_admin): Extension<AdminContext>,
) -> Result<Json<DoctorsResponse>, ApiError> {
    let directory = ctx.state.directory()?;
    let doctors = db::list_doctors(&directory)?
        .into_iter()
        .map(DoctorView::profile)
        .collect();
    Ok(Json(DoctorsResponse {
        success: true,
        doctors,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAvailabilityRequest {
    #[serde(default)]
    pub doc_id: String,
}

/// `POST /api/admin/change-availability` — flip a doctor's flag.
pub async fn change_availability(
    State(ctx): State<ApiContext>,
    Extension(_admin): Extension<AdminContext>,
    Json(req): Json<ChangeAvailabilityRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = Uuid::parse_str(&req.doc_id)
        .map_err(|_| ApiError::NotFound("Doctor not found".into()))?;
    let directory = ctx.state.directory()?;
    let doctor = db::get_doctor(&directory, &id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    db::set_doctor_availability(&directory, &id, !doctor.available)?;
    Ok(Json(MessageResponse::ok("Availability changed")))
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub success: bool,
    pub appointments: Vec<AppointmentView>,
}

/// `GET /api/admin/appointments` — every booking in the system.
pub async fn appointments(
    State(ctx): State<ApiContext>,
    Extension(_admin): Extension<AdminContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let directory = ctx.state.directory()?;
    let appointments = db::all_appointments(&directory)?
        .into_iter()
        .map(AppointmentView::from)
        .collect();
    Ok(Json(AppointmentsResponse {
        success: true,
        appointments,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    #[serde(default)]
    pub appointment_id: String,
}

/// `POST /api/admin/cancel-appointment` — cancel any booking. Same
/// transition rules as everyone else; no ownership check.
pub async fn cancel_appointment(
    State(ctx): State<ApiContext>,
    Extension(_admin): Extension<AdminContext>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = Uuid::parse_str(&req.appointment_id)
        .map_err(|_| ApiError::NotFound("Appointment not found".into()))?;
    let directory = ctx.state.directory()?;
    let appointment = db::get_appointment(&directory, &id)?
        .ok_or_else(|| ApiError::NotFound("Appointment not found".into()))?;
    let flags = transition_flags(appointment.status(), AppointmentStatus::Cancelled)?;
    db::set_status_flags(&directory, &id, flags)?;
    Ok(Json(MessageResponse::ok("Appointment cancelled")))
}

/// How many recent bookings the dashboard shows.
const LATEST_APPOINTMENTS: i64 = 5;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardData {
    pub doctors: i64,
    pub appointments: i64,
    pub patients: i64,
    pub latest_appointments: Vec<AppointmentView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub success: bool,
    pub dashboard_data: AdminDashboardData,
}

/// `GET /api/admin/dashboard` — system-wide counts plus the five most
/// recent bookings.
pub async fn dashboard(
    State(ctx): State<ApiContext>,
    Extension(_admin): Extension<AdminContext>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let directory = ctx.state.directory()?;
    let doctors = db::count_doctors(&directory)?;
    let appointments = db::count_appointments(&directory)?;
    let patients = db::count_users(&directory)?;
    let latest_appointments = db::latest_appointments(&directory, LATEST_APPOINTMENTS)?
        .into_iter()
        .map(AppointmentView::from)
        .collect();

    Ok(Json(DashboardResponse {
        success: true,
        dashboard_data: AdminDashboardData {
            doctors,
            appointments,
            patients,
            latest_appointments,
        },
    }))
}
