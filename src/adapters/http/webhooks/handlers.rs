//! HTTP handler for Stripe webhook deliveries.
//!
//! Maps processing results onto the status codes Stripe acts on:
//! 200 stops redelivery, 400 marks the delivery as rejected, 500 asks
//! Stripe to try again later.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    HandleStripeWebhookCommand, HandleStripeWebhookHandler,
};
use crate::domain::billing::WebhookError;

use super::dto::{ErrorResponse, WebhookAckResponse};

/// Header carrying the Stripe signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct WebhookAppState {
    pub webhook_handler: Arc<HandleStripeWebhookHandler>,
}

impl WebhookAppState {
    pub fn new(webhook_handler: Arc<HandleStripeWebhookHandler>) -> Self {
        Self { webhook_handler }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/stripe - Handle Stripe webhook events
pub async fn handle_stripe_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandleStripeWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    let report = state.webhook_handler.handle(cmd).await?;

    let ack = if report.is_ignored() {
        WebhookAckResponse::not_handled()
    } else {
        WebhookAckResponse::processed()
    };
    Ok((StatusCode::OK, Json(ack)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        let error_code = self.0.error_code();

        let body = match &self.0 {
            // Datastore details stay in the logs.
            WebhookError::Persistence(_) => {
                ErrorResponse::retryable(error_code, "Temporary failure, please retry")
            }
            err if err.is_retryable() => ErrorResponse::retryable(error_code, err.to_string()),
            err => ErrorResponse::new(error_code, err.to_string()),
        };

        if self.0.is_retryable() {
            tracing::warn!(error_code, status = status.as_u16(), "Webhook will be retried");
        }

        (status, Json(body)).into_response()
    }
}
