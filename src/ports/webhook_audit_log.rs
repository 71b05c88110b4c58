//! WebhookAuditLog port - One audit row per Stripe event.
//!
//! Every delivery that reaches reconciliation leaves a row keyed by the
//! Stripe event id. Redeliveries overwrite the row, so it always reflects
//! the most recent attempt.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// Outcome stored in the audit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditOutcome {
    /// Subscription confirmed by this delivery.
    Success,
    /// Transient failure; Stripe was asked to redeliver.
    Retry,
    /// Nothing to do (already confirmed or lost a race).
    Skipped,
    /// Permanent or datastore failure.
    Error,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
            AuditOutcome::Retry => "retry",
            AuditOutcome::Skipped => "skipped",
            AuditOutcome::Error => "error",
        }
    }

    /// Parses a stored outcome. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(AuditOutcome::Success),
            "retry" => Some(AuditOutcome::Retry),
            "skipped" => Some(AuditOutcome::Skipped),
            "error" => Some(AuditOutcome::Error),
            _ => None,
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit row.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookAuditRecord {
    /// Stripe event ID (evt_xxx format).
    pub event_id: String,

    /// Type of Stripe event (e.g., "payment_intent.succeeded").
    pub event_type: String,

    /// Payment intent id, when the payload yielded one.
    pub payment_intent_id: Option<String>,

    pub outcome: AuditOutcome,

    pub error_message: Option<String>,

    pub processed_at: DateTime<Utc>,
}

impl WebhookAuditRecord {
    pub fn new(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payment_intent_id: Option<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            payment_intent_id,
            outcome,
            error_message: None,
            processed_at: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// Port for writing and inspecting audit rows.
#[async_trait]
pub trait WebhookAuditLog: Send + Sync {
    /// Insert the record, or overwrite the existing row with the same event id.
    async fn upsert(&self, record: WebhookAuditRecord) -> Result<(), DomainError>;

    /// Find the row for a Stripe event ID.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookAuditRecord>, DomainError>;

    /// Delete rows processed before the timestamp.
    ///
    /// Returns the number of rows deleted.
    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_round_trips_through_storage_form() {
        for outcome in [
            AuditOutcome::Success,
            AuditOutcome::Retry,
            AuditOutcome::Skipped,
            AuditOutcome::Error,
        ] {
            assert_eq!(AuditOutcome::parse(outcome.as_str()), Some(outcome));
        }
    }

    #[test]
    fn unknown_outcome_is_rejected() {
        assert_eq!(AuditOutcome::parse("ignored"), None);
    }

    #[test]
    fn record_message_is_optional() {
        let record = WebhookAuditRecord::new(
            "evt_1",
            "payment_intent.succeeded",
            Some("pi_1".to_string()),
            AuditOutcome::Success,
        );
        assert!(record.error_message.is_none());

        let record = record.with_message("Subscription not in pending_webhook status");
        assert_eq!(
            record.error_message.as_deref(),
            Some("Subscription not in pending_webhook status")
        );
    }
}
