//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (errors, state machine trait)
//! - `billing` - Stripe events, subscriptions and webhook processing
pub mod billing;
pub mod foundation;
