//! In-memory adapters with the same semantics as the PostgreSQL and HTTP ones.
//!
//! Used by tests and by local runs without a database.

mod recording_notifier;
mod subscription_repository;
mod webhook_audit_log;

pub use recording_notifier::{RecordedConfirmation, RecordingNotifier};
pub use subscription_repository::InMemorySubscriptionRepository;
pub use webhook_audit_log::InMemoryWebhookAuditLog;
