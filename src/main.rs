//! Webhook Bridge server binary.
//!
//! Loads configuration, connects to PostgreSQL, wires the webhook pipeline
//! and serves it until SIGINT or SIGTERM.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use webhook_bridge::adapters::downstream::HttpConfirmationNotifier;
use webhook_bridge::adapters::http::{app_router, OpsAppState, WebhookAppState};
use webhook_bridge::adapters::postgres::{
    PostgresSubscriptionRepository, PostgresWebhookAuditLog,
};
use webhook_bridge::application::handlers::billing::{
    AuditTrail, HandleStripeWebhookHandler, ReconcilePaymentHandler,
};
use webhook_bridge::config::{AppConfig, ConfigError, LogFormat, ServerConfig, ValidationError};
use webhook_bridge::domain::billing::EventRouter;
use webhook_bridge::ports::WebhookAuditLog;

/// Errors that stop the service from starting.
#[derive(Debug, Error)]
enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), BootstrapError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting webhook bridge"
    );

    // Database
    let pool = config.database.connect().await?;
    tracing::info!("Database connection established");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let subscriptions = Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
    let audit_log = Arc::new(PostgresWebhookAuditLog::new(pool.clone()));

    if let Some(days) = config.audit.retention_days {
        sweep_audit_log(audit_log.as_ref(), days).await;
    }

    // Downstream
    let notifier = Arc::new(HttpConfirmationNotifier::new(
        config.downstream.notifier_settings(),
    )?);

    // Webhook pipeline
    let reconcile = ReconcilePaymentHandler::new(
        subscriptions.clone(),
        notifier.clone(),
        AuditTrail::new(audit_log, config.audit.write_timeout()),
    );
    let router = EventRouter::new().register(Arc::new(reconcile));
    let webhook_handler = HandleStripeWebhookHandler::new(
        Arc::new(config.payment.verifier()),
        Arc::new(router),
    );

    let app = app_router(
        WebhookAppState::new(Arc::new(webhook_handler)),
        OpsAppState::new(subscriptions, notifier),
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` wins over `server.log_level`.
fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    match server.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Deletes audit rows past retention. Failure is logged and ignored.
async fn sweep_audit_log(audit_log: &dyn WebhookAuditLog, retention_days: u32) {
    let cutoff = Utc::now() - ChronoDuration::days(i64::from(retention_days));
    match audit_log.delete_before(cutoff).await {
        Ok(deleted) => tracing::info!(deleted, retention_days, "Audit log retention sweep done"),
        Err(e) => tracing::error!(error = %e, "Audit log retention sweep failed"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
