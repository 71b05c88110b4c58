//! AuditTrail - Best-effort writer in front of the `WebhookAuditLog` port.
//!
//! Each outcome is written exactly once, bounded by a timeout. A failed or
//! timed out write is logged and returned as a `Warning`; it never turns
//! into an error for the caller.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::billing::{StripeEvent, Warning};
use crate::domain::foundation::DomainError;
use crate::ports::{AuditOutcome, WebhookAuditLog, WebhookAuditRecord};

/// Default bound on a single audit write.
pub const DEFAULT_AUDIT_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Clone)]
pub struct AuditTrail {
    log: Arc<dyn WebhookAuditLog>,
    timeout: Duration,
}

impl AuditTrail {
    pub fn new(log: Arc<dyn WebhookAuditLog>, timeout: Duration) -> Self {
        Self { log, timeout }
    }

    /// Records the outcome for `event`.
    ///
    /// Returns `Some(Warning::Audit)` when the row could not be written.
    pub async fn record(
        &self,
        event: &StripeEvent,
        payment_intent_id: Option<&str>,
        outcome: AuditOutcome,
        message: Option<String>,
    ) -> Option<Warning> {
        let mut record = WebhookAuditRecord::new(
            event.id.clone(),
            event.event_type.clone(),
            payment_intent_id.map(str::to_string),
            outcome,
        );
        record.error_message = message;

        let failure = match tokio::time::timeout(self.timeout, self.log.upsert(record)).await {
            Ok(Ok(())) => return None,
            Ok(Err(e)) => e.to_string(),
            Err(_) => DomainError::timeout(format!(
                "audit write exceeded {}ms",
                self.timeout.as_millis()
            ))
            .to_string(),
        };

        tracing::error!(
            event_id = %event.id,
            event_type = %event.event_type,
            outcome = %outcome,
            error = %failure,
            "Failed to write webhook audit log"
        );
        Some(Warning::Audit(failure))
    }
}
