//! Stripe webhook event types.
//!
//! Defines the envelope parsed from a verified webhook payload.
//! Only fields relevant to our processing are captured.

use serde::{Deserialize, Serialize};

/// Stripe webhook event (simplified).
///
/// `api_version` is optional and never validated: an event rendered with a
/// newer or older API version than we expect is still processed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "payment_intent.succeeded").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    #[serde(default)]
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,

    /// API version used to render this event.
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::parse(&self.event_type)
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }

    /// Reads `data.object.id` without requiring the rest of the object to be valid.
    pub fn object_id(&self) -> Option<&str> {
        self.data.object.get("id").and_then(|v| v.as_str())
    }
}

/// Stripe event types this service recognises by name.
///
/// Only `PaymentIntentSucceeded` is acted upon; the others are named so they
/// show up readably in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripeEventType {
    /// Payment intent completed successfully.
    PaymentIntentSucceeded,
    /// Payment intent failed to capture.
    PaymentIntentPaymentFailed,
    /// Payment intent was canceled.
    PaymentIntentCanceled,
    /// Any other event type, including ones Stripe adds in the future.
    Unknown,
}

impl StripeEventType {
    /// Parse event type from string.
    pub fn parse(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentPaymentFailed,
            "payment_intent.canceled" => Self::PaymentIntentCanceled,
            _ => Self::Unknown,
        }
    }

    /// Convert to the Stripe event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentIntentSucceeded => "payment_intent.succeeded",
            Self::PaymentIntentPaymentFailed => "payment_intent.payment_failed",
            Self::PaymentIntentCanceled => "payment_intent.canceled",
            Self::Unknown => "unknown",
        }
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
    api_version: Option<String>,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "payment_intent.succeeded".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
            api_version: Some("2023-10-16".to_string()),
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    /// Convenience for a well-formed succeeded payment intent object.
    pub fn payment_intent(self, id: &str, amount: i64, currency: &str) -> Self {
        self.object(serde_json::json!({
            "id": id,
            "object": "payment_intent",
            "status": "succeeded",
            "amount": amount,
            "currency": currency,
            "metadata": {}
        }))
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
            },
            livemode: self.livemode,
            api_version: self.api_version,
        }
    }
}
