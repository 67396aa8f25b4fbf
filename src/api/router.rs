//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum
//! server. Route groups under `/api/`:
//!
//! - `/api/user` — register/login public, booking behind the user guard
//! - `/api/doctor` — list/login public, dashboard behind the doctor guard
//! - `/api/medical-records` — all behind the doctor guard
//! - `/api/admin` — login public, management behind the admin guard
//!
//! Middleware uses `Extension<ApiContext>` (injected as the outermost
//! layer of each guarded group). Handlers use `State<ApiContext>`
//! provided via `with_state`.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::state::AppState;

/// Build the full API router for the given application state.
pub fn api_router(state: Arc<AppState>) -> Router {
    build_router(ApiContext::new(state))
}

fn build_router(ctx: ApiContext) -> Router {
    let user_public = Router::new()
        .route("/register", post(endpoints::user::register))
        .route("/login", post(endpoints::user::login))
        .with_state(ctx.clone());

    let user_protected = Router::new()
        .route("/appointments", get(endpoints::user::list_appointments))
        .route("/book-appointment", post(endpoints::user::book_appointment))
        .route(
            "/cancel-appointment",
            post(endpoints::user::cancel_appointment),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::require_user))
        .layer(axum::Extension(ctx.clone()));

    let doctor_public = Router::new()
        .route("/list", get(endpoints::doctor::list))
        .route("/login", post(endpoints::doctor::login))
        .with_state(ctx.clone());

    let doctor_protected = Router::new()
        .route("/dashboard", get(endpoints::doctor::dashboard))
        .route("/appointments", get(endpoints::doctor::appointments))
        .route("/patients", get(endpoints::doctor::patients))
        .route("/profile", get(endpoints::doctor::profile))
        .route("/profile", put(endpoints::doctor::update_profile))
        .route(
            "/toggle-availability",
            post(endpoints::doctor::toggle_availability),
        )
        .route(
            "/update-appointment",
            post(endpoints::doctor::update_appointment),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::require_doctor))
        .layer(axum::Extension(ctx.clone()));

    let records = Router::new()
        .route(
            "/patient-profile",
            post(endpoints::records::upsert_patient_profile),
        )
        .route(
            "/patient-profile/:patientId",
            get(endpoints::records::patient_profile),
        )
        .route(
            "/patient/:patientId/records",
            get(endpoints::records::list_records),
        )
        .route("/records", post(endpoints::records::create_record))
        .route("/records/:recordId", get(endpoints::records::get_record))
        .route("/records/:recordId", put(endpoints::records::update_record))
        .route(
            "/records/:recordId/prescriptions",
            post(endpoints::records::add_prescription),
        )
        .route(
            "/records/:recordId/vital-signs",
            post(endpoints::records::add_vital_signs),
        )
        .route(
            "/records/:recordId/lab-results",
            post(endpoints::records::add_lab_result),
        )
        .route("/sync-patients", post(endpoints::records::sync_patients))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::require_doctor))
        .layer(axum::Extension(ctx.clone()));

    let admin_public = Router::new()
        .route("/login", post(endpoints::admin::login))
        .with_state(ctx.clone());

    let admin_protected = Router::new()
        .route("/add-doctor", post(endpoints::admin::add_doctor))
        .route("/doctors", get(endpoints::admin::doctors))
        .route(
            "/change-availability",
            post(endpoints::admin::change_availability),
        )
        .route("/appointments", get(endpoints::admin::appointments))
        .route(
            "/cancel-appointment",
            post(endpoints::admin::cancel_appointment),
        )
        .route("/dashboard", get(endpoints::admin::dashboard))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::require_admin))
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api/user", user_public)
        .nest("/api/user", user_protected)
        .nest("/api/doctor", doctor_public)
        .nest("/api/doctor", doctor_protected)
        .nest("/api/medical-records", records)
        .nest("/api/admin", admin_public)
        .nest("/api/admin", admin_protected)
        .layer(CorsLayer::permissive())
}
