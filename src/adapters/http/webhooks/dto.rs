//! Response bodies for the webhook endpoint.

use serde::{Deserialize, Serialize};

/// Body returned with every 200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub message: String,
}

impl WebhookAckResponse {
    /// The event reached a handler (confirmed or skipped).
    pub fn processed() -> Self {
        Self {
            message: "Event processed successfully".to_string(),
        }
    }

    /// No handler exists for the event type.
    pub fn not_handled() -> Self {
        Self {
            message: "Event type not handled".to_string(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Retryable failures set this so operators can tell them apart in logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            retryable: None,
        }
    }

    pub fn retryable(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            retryable: Some(true),
            ..Self::new(error_code, message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_messages_are_neutral() {
        assert_eq!(
            serde_json::to_value(WebhookAckResponse::processed()).unwrap(),
            serde_json::json!({"message": "Event processed successfully"})
        );
        assert_eq!(
            serde_json::to_value(WebhookAckResponse::not_handled()).unwrap(),
            serde_json::json!({"message": "Event type not handled"})
        );
    }

    #[test]
    fn error_response_omits_retryable_when_unset() {
        let json = serde_json::to_value(ErrorResponse::new("INVALID_SIGNATURE", "bad")).unwrap();
        assert!(json.get("retryable").is_none());

        let json = serde_json::to_value(ErrorResponse::retryable("SUBSCRIPTION_NOT_FOUND", "x"))
            .unwrap();
        assert_eq!(json["retryable"], true);
    }
}
