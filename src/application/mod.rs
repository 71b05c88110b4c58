//! Application layer - Command handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    AuditTrail, HandleStripeWebhookCommand, HandleStripeWebhookHandler, ReconcilePaymentHandler,
    DEFAULT_AUDIT_TIMEOUT,
};
