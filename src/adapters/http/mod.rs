//! HTTP adapters - axum routers for the webhook and operational endpoints.

pub mod ops;
pub mod webhooks;

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use ops::{ops_routes, OpsAppState};
pub use webhooks::{webhook_router, WebhookAppState};

/// Builds the full application router.
///
/// # Routes
/// - `POST /webhooks/stripe`
/// - `GET /health`, `GET /ready`, `GET /status`
pub fn app_router(
    webhook_state: WebhookAppState,
    ops_state: OpsAppState,
    request_timeout: Duration,
) -> Router {
    Router::new()
        .merge(webhook_router().with_state(webhook_state))
        .merge(ops_routes().with_state(ops_state))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
