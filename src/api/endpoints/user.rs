//! Patient-facing endpoints.
//!
//! - `POST /api/user/register` — create an account, returns a token
//! - `POST /api/user/login` — credential check, returns a token
//! - `GET  /api/user/appointments` — own bookings, newest first
//! - `POST /api/user/book-appointment` — book a free slot
//! - `POST /api/user/cancel-appointment` — cancel an own booking

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::{transition_flags, AppointmentView, TokenResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, MessageResponse, UserContext};
use crate::auth;
use crate::db;
use crate::models::{
    Appointment, AppointmentStatus, DoctorSnapshot, PatientSnapshot, PaymentStatus, Role, User,
};

/// Minimum password length enforced at registration.
pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) const WEAK_PASSWORD_MESSAGE: &str = "Password is not strong. It should be at least 8 \
     characters long and include uppercase letters, lowercase letters, numbers, and symbols.";

/// Shallow shape check: something before and after the `@`, a dot in
/// the domain, no whitespace. Deliverability is not our problem.
pub(crate) fn valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

/// `POST /api/user/register` — create a patient account.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("Missing details".into()));
    }
    let email = req.email.trim();
    if !valid_email(email) {
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(WEAK_PASSWORD_MESSAGE.into()));
    }

    // Hash outside the store lock; PBKDF2 is the slow part.
    let password_hash = auth::hash_password(&req.password)?;
    let user = User {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        email: email.to_string(),
        password_hash,
        phone: None,
        date_of_birth: None,
    };

    let directory = ctx.state.directory()?;
    if db::find_user_by_email(&directory, &user.email)?.is_some() {
        return Err(ApiError::Validation("User already exists".into()));
    }
    db::insert_user(&directory, &user)?;
    let token = auth::issue_token(&directory, &Role::User, &user.id.to_string())?;

    Ok(Json(RegisterResponse {
        success: true,
        message: "User registered successfully".into(),
        token,
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /api/user/login` — credential check, fresh token.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let directory = ctx.state.directory()?;
    let user = db::find_user_by_email(&directory, req.email.trim())?
        .ok_or(ApiError::InvalidCredentials)?;
    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }
    let token = auth::issue_token(&directory, &Role::User, &user.id.to_string())?;
    Ok(Json(TokenResponse::new(token)))
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub success: bool,
    pub appointments: Vec<AppointmentView>,
}

/// `GET /api/user/appointments` — own bookings, newest first.
pub async fn list_appointments(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let directory = ctx.state.directory()?;
    let appointments = db::appointments_for_user(&directory, &user.user_id)?
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
pub struct BookRequest {
    #[serde(default)]
    pub doc_id: String,
    #[serde(default)]
    pub slot_date: String,
    #[serde(default)]
    pub slot_time: String,
}

/// `POST /api/user/book-appointment` — book a slot with a doctor.
///
/// Embeds patient and doctor snapshots into the document so listings
/// and the roster render without joining back to the live rows.
pub async fn book_appointment(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(req): Json<BookRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if req.doc_id.trim().is_empty()
        || req.slot_date.trim().is_empty()
        || req.slot_time.trim().is_empty()
    {
        return Err(ApiError::Validation("Missing details".into()));
    }
    let doc_uuid = Uuid::parse_str(&req.doc_id)
        .map_err(|_| ApiError::NotFound("Doctor not found".into()))?;
    let user_uuid = Uuid::parse_str(&user.user_id).map_err(|_| ApiError::Unauthorized)?;

    let directory = ctx.state.directory()?;
    let doctor = db::get_doctor(&directory, &doc_uuid)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    if !doctor.available {
        return Err(ApiError::Validation("Doctor not available".into()));
    }
    if db::slot_taken(&directory, &req.doc_id, &req.slot_date, &req.slot_time)? {
        return Err(ApiError::Validation("Slot not available".into()));
    }
    let account = db::get_user(&directory, &user_uuid)?.ok_or(ApiError::Unauthorized)?;

    let appointment = Appointment {
        id: Uuid::new_v4(),
        user_id: user.user_id.clone(),
        doc_id: req.doc_id.clone(),
        slot_date: req.slot_date.clone(),
        slot_time: req.slot_time.clone(),
        user_data: PatientSnapshot {
            name: account.name,
            email: Some(account.email),
            phone: account.phone,
            date_of_birth: account.date_of_birth,
        },
        doc_data: DoctorSnapshot {
            name: doctor.name,
            speciality: doctor.speciality,
            fees: doctor.fees,
        },
        amount: doctor.fees,
        date: Utc::now().timestamp_millis(),
        cancelled: false,
        is_completed: false,
        // NULL is reserved for rows predating the confirmation flag
        is_confirmed: Some(false),
        payment: false,
        payment_status: PaymentStatus::Pending,
        paid_at: None,
    };
    db::insert_appointment(&directory, &appointment)?;

    Ok(Json(MessageResponse::ok("Appointment booked")))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    #[serde(default)]
    pub appointment_id: String,
}

/// `POST /api/user/cancel-appointment` — cancel an own booking.
pub async fn cancel_appointment(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = Uuid::parse_str(&req.appointment_id)
        .map_err(|_| ApiError::NotFound("Appointment not found".into()))?;

    let directory = ctx.state.directory()?;
    let appointment = db::get_appointment(&directory, &id)?
        .ok_or_else(|| ApiError::NotFound("Appointment not found".into()))?;
    if appointment.user_id != user.user_id {
        return Err(ApiError::UnauthorizedAction);
    }
    let flags = transition_flags(appointment.status(), AppointmentStatus::Cancelled)?;
    db::set_status_flags(&directory, &id, flags)?;

    Ok(Json(MessageResponse::ok("Appointment cancelled")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check_accepts_plain_addresses() {
        assert!(valid_email("jane@example.com"));
        assert!(valid_email("j.doe+tag@clinic.co.uk"));
    }

    #[test]
    fn email_check_rejects_malformed_addresses() {
        assert!(!valid_email("janeexample.com"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("jane@nodot"));
        assert!(!valid_email("jane@.com"));
        assert!(!valid_email("jane doe@example.com"));
    }
}
