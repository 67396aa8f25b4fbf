//! API error type and its wire mapping.
//!
//! Every failure leaving a handler becomes `{"success": false,
//! "message": "..."}` with a status code that actually describes the
//! failure: 400 for bad input, 401 for missing or stale credentials,
//! 404 for unknown resources, 500 for everything that is our fault.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::db::StoreError;
use crate::state::StateError;

/// Errors surfaced to API clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request payload failed validation. The message is safe to show.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, or expired credentials.
    #[error("Not authorized. Login again.")]
    Unauthorized,

    /// Login attempt with a bad email or password. Deliberately the
    /// same message whether the account exists or not.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but acting on a resource that belongs to
    /// someone else.
    #[error("Unauthorized action")]
    UnauthorizedAction,

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Anything the client cannot fix. Logged server side, replaced
    /// with a generic message on the wire.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized
            | ApiError::InvalidCredentials
            | ApiError::UnauthorizedAction => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            success: false,
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// "medical_record" becomes "Medical record not found".
fn not_found_message(entity: &str) -> String {
    let spaced = entity.replace('_', " ");
    let mut chars = spaced.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    };
    format!("{capitalized} not found")
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, .. } => ApiError::NotFound(not_found_message(&entity)),
            invalid @ StoreError::InvalidEnum { .. } => ApiError::Validation(invalid.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StateError> for ApiError {
    fn from(err: StateError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_parts(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_maps_to_400_with_message() {
        let (status, body) = response_parts(ApiError::Validation("Missing details".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Missing details");
    }

    #[tokio::test]
    async fn unauthorized_uses_the_login_again_message() {
        let (status, body) = response_parts(ApiError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Not authorized. Login again.");
    }

    #[tokio::test]
    async fn login_failures_are_401_with_their_own_message() {
        let (status, body) = response_parts(ApiError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn acting_on_foreign_resources_is_401() {
        let (status, body) = response_parts(ApiError::UnauthorizedAction).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized action");
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, body) = response_parts(ApiError::NotFound("Doctor not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Doctor not found");
    }

    #[tokio::test]
    async fn internal_hides_the_detail() {
        let (status, body) =
            response_parts(ApiError::Internal("database exploded".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn store_not_found_spells_out_the_entity() {
        let err = StoreError::NotFound {
            entity: "medical_record".into(),
            id: "abc".into(),
        };
        let (status, body) = response_parts(err.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Medical record not found");
    }

    #[tokio::test]
    async fn store_invalid_enum_is_a_client_error() {
        let err = StoreError::InvalidEnum {
            field: "status".into(),
            value: "nonsense".into(),
        };
        let (status, _) = response_parts(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn entity_names_read_like_english() {
        assert_eq!(not_found_message("appointment"), "Appointment not found");
        assert_eq!(not_found_message("vital_signs"), "Vital signs not found");
    }
}
