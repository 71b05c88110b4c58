//! Billing handlers: Stripe webhook verification, routing and reconciliation.

mod audit_trail;
mod handle_stripe_webhook;
mod reconcile_payment;

pub use audit_trail::{AuditTrail, DEFAULT_AUDIT_TIMEOUT};
pub use handle_stripe_webhook::{HandleStripeWebhookCommand, HandleStripeWebhookHandler};
pub use reconcile_payment::{ReconcilePaymentHandler, NOT_FOUND_MESSAGE, NOT_PENDING_MESSAGE};
