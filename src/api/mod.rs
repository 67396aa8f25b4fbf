//! HTTP API.
//!
//! Four route groups under `/api/`: public (login/register/doctor
//! list), user booking, doctor dashboard + medical records, and admin.
//! Bearer-token middleware guards the protected groups; handlers reach
//! the stores through `ApiContext`.
//!
//! The router is composable — `api_router()` returns a `Router` that
//! can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
