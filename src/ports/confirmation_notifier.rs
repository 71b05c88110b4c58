//! ConfirmationNotifier port - Tells the downstream application a
//! subscription was confirmed.
//!
//! Notification is best-effort. Callers log failures and continue; a
//! failed notification never changes the webhook response.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the downstream API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// Request could not be sent or timed out.
    #[error("Downstream request failed: {0}")]
    Transport(String),

    /// Downstream answered with a non-success status.
    #[error("Downstream returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Port for notifying the downstream application.
#[async_trait]
pub trait ConfirmationNotifier: Send + Sync {
    /// Report that the subscription was confirmed by a webhook.
    async fn notify_confirmed(
        &self,
        user_id: i64,
        subscription_id: i64,
        payment_intent_id: &str,
    ) -> Result<(), NotificationError>;

    /// Succeeds iff the downstream health endpoint answers 200.
    async fn health_check(&self) -> Result<(), NotificationError>;
}
