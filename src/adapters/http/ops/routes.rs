//! Axum router configuration for operational endpoints.

use axum::{routing::get, Router};

use super::handlers::{health, ready, status, OpsAppState};

/// # Routes
/// - `GET /health` - Liveness
/// - `GET /ready` - Readiness with dependency health
/// - `GET /status` - Version and uptime
pub fn ops_routes() -> Router<OpsAppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/status", get(status))
}
