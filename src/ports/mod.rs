//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SubscriptionRepository` - Lookup and conditional confirmation of subscriptions
//! - `WebhookAuditLog` - Per-event audit trail, upserted by Stripe event id
//! - `ConfirmationNotifier` - Best-effort call to the downstream application

mod confirmation_notifier;
mod subscription_repository;
mod webhook_audit_log;

pub use confirmation_notifier::{ConfirmationNotifier, NotificationError};
pub use subscription_repository::{ConfirmResult, SubscriptionRepository};
pub use webhook_audit_log::{AuditOutcome, WebhookAuditLog, WebhookAuditRecord};
