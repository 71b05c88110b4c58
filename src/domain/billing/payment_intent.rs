//! Payment intent fields extracted from a `payment_intent.succeeded` event.

use std::collections::HashMap;

use serde::Deserialize;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// The subset of a Stripe PaymentIntent the reconciliation needs.
///
/// `amount` is in the currency's minor unit (cents for USD).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    /// Extracts the payment intent from a verified event.
    ///
    /// # Errors
    ///
    /// `MalformedPayload` when `id`, `amount` or `currency` is missing or
    /// mistyped, or when `id` is empty. Redelivering the same bytes cannot fix
    /// this, so the error is permanent.
    pub fn from_event(event: &StripeEvent) -> Result<Self, WebhookError> {
        let intent: PaymentIntent = event
            .deserialize_object()
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

        if intent.id.trim().is_empty() {
            return Err(WebhookError::MalformedPayload(
                "payment intent id is empty".to_string(),
            ));
        }

        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::StripeEventBuilder;
    use serde_json::json;

    #[test]
    fn parses_complete_payment_intent() {
        let event = StripeEventBuilder::new()
            .object(json!({
                "id": "pi_123",
                "object": "payment_intent",
                "status": "succeeded",
                "amount": 1999,
                "currency": "usd",
                "metadata": {"plan_type": "monthly"}
            }))
            .build();

        let intent = PaymentIntent::from_event(&event).unwrap();

        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.status.as_deref(), Some("succeeded"));
        assert_eq!(intent.amount, 1999);
        assert_eq!(intent.currency, "usd");
        assert_eq!(intent.metadata.get("plan_type").map(String::as_str), Some("monthly"));
    }

    #[test]
    fn status_and_metadata_are_optional() {
        let event = StripeEventBuilder::new()
            .object(json!({"id": "pi_1", "amount": 100, "currency": "eur"}))
            .build();

        let intent = PaymentIntent::from_event(&event).unwrap();

        assert!(intent.status.is_none());
        assert!(intent.metadata.is_empty());
    }

    #[test]
    fn missing_amount_is_malformed() {
        let event = StripeEventBuilder::new()
            .object(json!({"id": "pi_1", "currency": "usd"}))
            .build();

        let result = PaymentIntent::from_event(&event);

        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn missing_id_is_malformed() {
        let event = StripeEventBuilder::new()
            .object(json!({"amount": 100, "currency": "usd"}))
            .build();

        let result = PaymentIntent::from_event(&event);

        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn empty_id_is_malformed() {
        let event = StripeEventBuilder::new()
            .object(json!({"id": "  ", "amount": 100, "currency": "usd"}))
            .build();

        let result = PaymentIntent::from_event(&event);

        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn mistyped_amount_is_malformed() {
        let event = StripeEventBuilder::new()
            .object(json!({"id": "pi_1", "amount": "19.99", "currency": "usd"}))
            .build();

        let result = PaymentIntent::from_event(&event);

        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }
}
