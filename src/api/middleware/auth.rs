//! Bearer-token guards for the three principal roles.
//!
//! Each guard reads `Authorization: Bearer <token>`, resolves the
//! token against the directory store, checks the role matches, and
//! injects the principal context for handlers downstream. Every
//! failure mode collapses into the same 401 so callers cannot probe
//! which part of the check failed.

use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::error::ApiError;
use crate::api::types::{AdminContext, ApiContext, DoctorContext, UserContext};
use crate::auth;
use crate::models::Role;

fn bearer_token(req: &Request) -> Result<String, ApiError> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
        .ok_or(ApiError::Unauthorized)
}

/// Resolve the request's bearer token to `(role, principal_id)`.
///
/// Holds the directory lock only for the lookup itself, never across
/// an await point.
fn resolve_principal(req: &Request, ctx: &ApiContext) -> Result<(Role, String), ApiError> {
    let token = bearer_token(req)?;
    let directory = ctx.state.directory()?;
    auth::resolve_token(&directory, &token)?.ok_or(ApiError::Unauthorized)
}

fn context(req: &Request) -> Result<ApiContext, ApiError> {
    req.extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("request context missing".into()))
}

/// Require a logged-in patient account.
pub async fn require_user(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let ctx = context(&req)?;
    let (role, user_id) = resolve_principal(&req, &ctx)?;
    if role != Role::User {
        return Err(ApiError::Unauthorized);
    }
    req.extensions_mut().insert(UserContext { user_id });
    Ok(next.run(req).await)
}

/// Require a logged-in doctor account.
pub async fn require_doctor(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let ctx = context(&req)?;
    let (role, doctor_id) = resolve_principal(&req, &ctx)?;
    if role != Role::Doctor {
        return Err(ApiError::Unauthorized);
    }
    req.extensions_mut().insert(DoctorContext { doctor_id });
    Ok(next.run(req).await)
}

/// Require an admin token.
pub async fn require_admin(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let ctx = context(&req)?;
    let (role, _) = resolve_principal(&req, &ctx)?;
    if role != Role::Admin {
        return Err(ApiError::Unauthorized);
    }
    req.extensions_mut().insert(AdminContext);
    Ok(next.run(req).await)
}
