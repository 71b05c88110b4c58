//! Webhook Bridge - Stripe payment webhook reconciliation
//!
//! Receives Stripe `payment_intent.succeeded` webhooks, verifies them,
//! moves the matching subscription from `pending_webhook` to `active`,
//! records an audit row per event and notifies the downstream application.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
