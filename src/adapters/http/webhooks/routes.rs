//! Axum router configuration for webhook endpoints.

use axum::{routing::post, Router};

use super::handlers::{handle_stripe_webhook, WebhookAppState};

/// Create the Stripe webhook router.
///
/// Webhooks carry no user authentication; they are verified via signature.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Webhook routes mounted at `/webhooks`.
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new().nest("/webhooks", webhook_routes())
}
