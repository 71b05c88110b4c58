//! ConfirmationNotifier that records calls instead of sending them.
//!
//! Stands in for the downstream API in tests and local runs without a
//! backend. Can be switched into a failing mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{ConfirmationNotifier, NotificationError};

/// A single recorded confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedConfirmation {
    pub user_id: i64,
    pub subscription_id: i64,
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    calls: Arc<RwLock<Vec<RecordedConfirmation>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose calls are recorded and then rejected with a 503.
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.set_failing(true);
        notifier
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<RecordedConfirmation> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl ConfirmationNotifier for RecordingNotifier {
    async fn notify_confirmed(
        &self,
        user_id: i64,
        subscription_id: i64,
        payment_intent_id: &str,
    ) -> Result<(), NotificationError> {
        self.calls.write().await.push(RecordedConfirmation {
            user_id,
            subscription_id,
            payment_intent_id: payment_intent_id.to_string(),
        });

        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::Rejected {
                status: 503,
                body: "downstream unavailable".to_string(),
            });
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(NotificationError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}
