//! HTTP handlers for liveness, readiness and status.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Json, State};
use chrono::Utc;

use crate::ports::{ConfirmationNotifier, SubscriptionRepository};

use super::dto::{DependencyHealth, HealthResponse, ReadyResponse, StatusResponse};

pub const SERVICE_NAME: &str = "webhook-bridge";

#[derive(Clone)]
pub struct OpsAppState {
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub notifier: Arc<dyn ConfirmationNotifier>,
    pub started_at: Instant,
}

impl OpsAppState {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        notifier: Arc<dyn ConfirmationNotifier>,
    ) -> Self {
        Self {
            subscriptions,
            notifier,
            started_at: Instant::now(),
        }
    }
}

/// GET /health - Liveness
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        service: SERVICE_NAME.to_string(),
    })
}

/// GET /ready - Readiness
///
/// Always answers 200. An unhealthy downstream only degrades notifications,
/// which are best-effort, so it is reported and logged but does not fail
/// the probe.
pub async fn ready(State(state): State<OpsAppState>) -> Json<ReadyResponse> {
    let (database, downstream) =
        tokio::join!(state.subscriptions.ping(), state.notifier.health_check());

    if let Err(e) = &database {
        tracing::error!(error = %e, "Database readiness check failed");
    }
    if let Err(e) = &downstream {
        tracing::warn!(error = %e, "Downstream health check failed");
    }

    Json(ReadyResponse {
        status: "ready".to_string(),
        timestamp: Utc::now(),
        database: DependencyHealth::from_result(database),
        downstream: DependencyHealth::from_result(downstream),
    })
}

/// GET /status - Service status
pub async fn status(State(state): State<OpsAppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        timestamp: Utc::now(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemorySubscriptionRepository, RecordingNotifier};

    fn state(notifier: RecordingNotifier) -> (Arc<InMemorySubscriptionRepository>, OpsAppState) {
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let state = OpsAppState::new(subscriptions.clone(), Arc::new(notifier));
        (subscriptions, state)
    }

    #[tokio::test]
    async fn health_reports_service_name() {
        let Json(body) = health().await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, SERVICE_NAME);
    }

    #[tokio::test]
    async fn ready_reports_healthy_dependencies() {
        let (_, state) = state(RecordingNotifier::new());

        let Json(body) = ready(State(state)).await;

        assert_eq!(body.status, "ready");
        assert!(body.database.healthy);
        assert!(body.downstream.healthy);
    }

    #[tokio::test]
    async fn ready_stays_ready_when_downstream_is_down() {
        let (_, state) = state(RecordingNotifier::failing());

        let Json(body) = ready(State(state)).await;

        assert_eq!(body.status, "ready");
        assert!(!body.downstream.healthy);
        assert!(body.downstream.error.is_some());
    }

    #[tokio::test]
    async fn ready_reports_database_failure() {
        let (subscriptions, state) = state(RecordingNotifier::new());
        subscriptions.set_unavailable(true);

        let Json(body) = ready(State(state)).await;

        assert!(!body.database.healthy);
    }

    #[tokio::test]
    async fn status_reports_version() {
        let (_, state) = state(RecordingNotifier::new());

        let Json(body) = status(State(state)).await;

        assert_eq!(body.status, "running");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
