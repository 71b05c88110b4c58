//! HTTP adapter for liveness, readiness and status endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{DependencyHealth, HealthResponse, ReadyResponse, StatusResponse};
pub use handlers::{OpsAppState, SERVICE_NAME};
pub use routes::ops_routes;
