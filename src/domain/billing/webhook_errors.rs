//! Webhook error types for Stripe webhook handling.
//!
//! Defines every failure that can end webhook processing, together with the
//! retry semantics Stripe derives from our HTTP status code:
//! - 2xx: event acknowledged, Stripe stops delivering it
//! - 4xx: permanent rejection, Stripe stops delivering it
//! - 5xx: transient failure, Stripe redelivers later

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// How a failure must be treated by the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The payload could not be proven to come from Stripe.
    Authentication,
    /// The payload is authentic but can never be processed.
    Permanent,
    /// Processing may succeed on a later delivery.
    Retryable,
}

/// Errors that occur during webhook processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// No Stripe-Signature header was sent.
    #[error("Missing signature header")]
    MissingSignature,

    /// The Stripe-Signature header could not be parsed.
    #[error("Malformed signature header: {0}")]
    SignatureHeader(String),

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is older than the configured tolerance.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Authenticated body is not a Stripe event envelope.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Test mode event delivered while live mode is required.
    #[error("Test mode events are not accepted")]
    TestModeRejected,

    /// Event-specific fields are absent or mistyped.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// No subscription references the payment intent yet.
    #[error("Subscription not found for payment_intent_id: {0}")]
    SubscriptionNotFound(String),

    /// Datastore failure while reading or advancing the subscription.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl WebhookError {
    /// Classifies the error for the sender's redelivery logic.
    pub fn kind(&self) -> FailureKind {
        match self {
            WebhookError::MissingSignature
            | WebhookError::SignatureHeader(_)
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp => FailureKind::Authentication,

            WebhookError::ParseError(_)
            | WebhookError::TestModeRejected
            | WebhookError::MalformedPayload(_) => FailureKind::Permanent,

            WebhookError::SubscriptionNotFound(_) | WebhookError::Persistence(_) => {
                FailureKind::Retryable
            }
        }
    }

    /// Returns true if Stripe should redeliver this webhook.
    ///
    /// A missing subscription is retryable: the record may not be committed
    /// yet by the system that creates it.
    pub fn is_retryable(&self) -> bool {
        self.kind() == FailureKind::Retryable
    }

    /// Maps the error to the HTTP status code returned to Stripe.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            FailureKind::Authentication | FailureKind::Permanent => StatusCode::BAD_REQUEST,
            FailureKind::Retryable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::SignatureHeader(_) => "INVALID_SIGNATURE_HEADER",
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::TimestampOutOfRange => "TIMESTAMP_OUT_OF_RANGE",
            WebhookError::InvalidTimestamp => "INVALID_TIMESTAMP",
            WebhookError::ParseError(_) => "INVALID_PAYLOAD",
            WebhookError::TestModeRejected => "TEST_MODE_REJECTED",
            WebhookError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            WebhookError::SubscriptionNotFound(_) => "SUBSCRIPTION_NOT_FOUND",
            WebhookError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

/// Repository failures are datastore failures, which Stripe should retry.
impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    // ══════════════════════════════════════════════════════════════
    // Error Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_displays_correctly() {
        let err = WebhookError::InvalidSignature;
        assert_eq!(format!("{}", err), "Invalid signature");
    }

    #[test]
    fn subscription_not_found_displays_correlation_id() {
        let err = WebhookError::SubscriptionNotFound("pi_123".to_string());
        assert_eq!(
            format!("{}", err),
            "Subscription not found for payment_intent_id: pi_123"
        );
    }

    #[test]
    fn malformed_payload_displays_reason() {
        let err = WebhookError::MalformedPayload("missing field `amount`".to_string());
        assert_eq!(
            format!("{}", err),
            "Malformed payload: missing field `amount`"
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Classification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_failures_are_authentication_errors() {
        for err in [
            WebhookError::MissingSignature,
            WebhookError::SignatureHeader("missing timestamp".to_string()),
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::InvalidTimestamp,
        ] {
            assert_eq!(err.kind(), FailureKind::Authentication, "{:?}", err);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn malformed_payload_is_permanent_not_retryable() {
        let err = WebhookError::MalformedPayload("bad".to_string());
        assert_eq!(err.kind(), FailureKind::Permanent);
        assert!(!err.is_retryable());
    }

    #[test]
    fn subscription_not_found_is_retryable() {
        let err = WebhookError::SubscriptionNotFound("pi_1".to_string());
        assert_eq!(err.kind(), FailureKind::Retryable);
        assert!(err.is_retryable());
    }

    #[test]
    fn persistence_error_is_retryable() {
        let err = WebhookError::Persistence("connection lost".to_string());
        assert!(err.is_retryable());
    }

    #[test]
    fn malformed_and_not_found_are_distinct_kinds() {
        let malformed = WebhookError::MalformedPayload("x".to_string());
        let missing = WebhookError::SubscriptionNotFound("pi_1".to_string());
        assert_ne!(malformed.kind(), missing.kind());
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn authentication_errors_return_bad_request() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::MissingSignature.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::TimestampOutOfRange.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn permanent_errors_return_bad_request() {
        assert_eq!(
            WebhookError::ParseError("eof".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::MalformedPayload("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn retryable_errors_return_internal_error() {
        assert_eq!(
            WebhookError::SubscriptionNotFound("pi".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebhookError::Persistence("down".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_error_converts_to_persistence() {
        let err: WebhookError = DomainError::new(ErrorCode::DatabaseError, "pool closed").into();
        assert!(matches!(err, WebhookError::Persistence(_)));
        assert!(err.is_retryable());
    }
}
