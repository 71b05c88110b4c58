//! Billing domain module.
//!
//! Stripe webhook verification, event routing and the subscription state
//! this service is allowed to advance.
//!
//! # Module Structure
//!
//! - `stripe_event` - Verified webhook envelope and event type names
//! - `payment_intent` - Fields read from `payment_intent.succeeded`
//! - `subscription` - Subscription record and its status state machine
//! - `webhook_errors` - Failure taxonomy with retry semantics
//! - `webhook_verifier` - HMAC-SHA256 signature verification
//! - `webhook_processor` - Handler/dispatcher traits and processing reports

mod payment_intent;
mod stripe_event;
mod subscription;
mod webhook_errors;
mod webhook_processor;
mod webhook_verifier;

pub use payment_intent::PaymentIntent;
#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
pub use subscription::{Subscription, SubscriptionStatus};
pub use webhook_errors::{FailureKind, WebhookError};
pub use webhook_processor::{
    EventRouter, ProcessingReport, SkipReason, WebhookDispatcher, WebhookEventHandler,
    WebhookOutcome, Warning,
};
pub use webhook_verifier::{
    sign_payload, SignatureHeader, StripeWebhookVerifier, VerifierSettings,
    DEFAULT_CLOCK_SKEW_SECS, DEFAULT_TOLERANCE_SECS,
};
