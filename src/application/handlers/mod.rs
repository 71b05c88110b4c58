//! Application handlers.
//!
//! Command handlers that orchestrate domain operations through ports.

pub mod billing;

pub use billing::{
    AuditTrail, HandleStripeWebhookCommand, HandleStripeWebhookHandler, ReconcilePaymentHandler,
    DEFAULT_AUDIT_TIMEOUT,
};
