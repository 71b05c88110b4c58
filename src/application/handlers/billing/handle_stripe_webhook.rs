//! HandleStripeWebhookHandler - Verifies a raw Stripe delivery and routes it.
//!
//! Nothing in the payload is interpreted until the signature has been
//! checked against the raw bytes.

use std::sync::Arc;

use crate::domain::billing::{
    ProcessingReport, StripeWebhookVerifier, WebhookDispatcher, WebhookError,
};

/// Command to handle one Stripe webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleStripeWebhookCommand {
    /// Raw request body, byte for byte as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value, if present.
    pub signature: Option<String>,
}

/// Verifies, parses and dispatches Stripe webhook deliveries.
pub struct HandleStripeWebhookHandler {
    verifier: Arc<StripeWebhookVerifier>,
    dispatcher: Arc<dyn WebhookDispatcher>,
}

impl HandleStripeWebhookHandler {
    pub fn new(verifier: Arc<StripeWebhookVerifier>, dispatcher: Arc<dyn WebhookDispatcher>) -> Self {
        Self {
            verifier,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleStripeWebhookCommand,
    ) -> Result<ProcessingReport, WebhookError> {
        // 1. Verify signature and parse the envelope
        let signature = cmd.signature.ok_or_else(|| {
            tracing::warn!("Webhook received without Stripe-Signature header");
            WebhookError::MissingSignature
        })?;

        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, &signature)
            .map_err(|e| {
                tracing::warn!(error = %e, error_code = e.error_code(), "Webhook verification failed");
                e
            })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Received Stripe webhook"
        );

        // 2. Dispatch to the handler for this event type
        let report = self.dispatcher.dispatch(&event).await?;

        for warning in &report.warnings {
            tracing::warn!(event_id = %event.id, warning = %warning, "Webhook processed with warning");
        }

        Ok(report)
    }
}
