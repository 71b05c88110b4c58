//! HTTP adapter for inbound Stripe webhooks.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, WebhookAckResponse};
pub use handlers::{handle_stripe_webhook, WebhookApiError, WebhookAppState, STRIPE_SIGNATURE_HEADER};
pub use routes::{webhook_router, webhook_routes};
