//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionRepository` - Subscription lookup and conditional confirmation
//! - `PostgresWebhookAuditLog` - `webhook_logs` upserts keyed by Stripe event id

mod subscription_repository;
mod webhook_audit_log;

pub use subscription_repository::PostgresSubscriptionRepository;
pub use webhook_audit_log::PostgresWebhookAuditLog;
