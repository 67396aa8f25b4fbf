//! Shared request context and principal types.

use std::sync::Arc;

use serde::Serialize;

use crate::state::AppState;

/// Handler context carried through the router as an axum `Extension`.
///
/// Cloning is cheap; the state itself lives behind one `Arc`.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
}

impl ApiContext {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

/// Authenticated patient-side principal, injected by `require_user`.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: String,
}

/// Authenticated doctor principal, injected by `require_doctor`.
#[derive(Debug, Clone)]
pub struct DoctorContext {
    pub doctor_id: String,
}

/// Marker for a request that passed the admin guard.
#[derive(Debug, Clone)]
pub struct AdminContext;

/// Bare `{"success": true, "message": ...}` envelope for endpoints
/// that have nothing else to say.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_response_serializes_flat() {
        let value = serde_json::to_value(MessageResponse::ok("Appointment booked")).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Appointment booked");
    }
}
