//! Adapters - Implementations of port interfaces.
//!
//! - `postgres` - Subscription and audit log storage in PostgreSQL
//! - `memory` - In-memory equivalents for tests and local runs
//! - `downstream` - HTTP client for the downstream application
//! - `http` - axum routes for inbound webhooks and operations

pub mod downstream;
pub mod http;
pub mod memory;
pub mod postgres;

pub use downstream::{HttpConfirmationNotifier, NotifierSettings};
pub use memory::{InMemorySubscriptionRepository, InMemoryWebhookAuditLog, RecordingNotifier};
pub use postgres::{PostgresSubscriptionRepository, PostgresWebhookAuditLog};
