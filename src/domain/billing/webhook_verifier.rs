//! Stripe webhook signature verification.
//!
//! Implements verification of Stripe webhook signatures using HMAC-SHA256,
//! with timestamp validation to prevent replay attacks. Nothing in the body
//! is interpreted until the signature has been accepted.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Default maximum age for webhook events (5 minutes).
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Default allowed clock skew for future events (1 minute).
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// v1 signatures (HMAC-SHA256). Stripe sends several while a secret rolls.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>]`. Other schemes,
    /// including legacy `v0`, are skipped.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::SignatureHeader` if the header format is invalid.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures: Vec<Vec<u8>> = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::SignatureHeader("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::SignatureHeader("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value).map_err(|_| {
                        WebhookError::SignatureHeader("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {
                    // Ignore unknown schemes for forward compatibility
                }
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| WebhookError::SignatureHeader("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::SignatureHeader(
                "missing v1 signature".to_string(),
            ));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Tunables for the verifier. Values come from `PaymentConfig`.
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    /// Oldest acceptable signature, in seconds.
    pub tolerance_secs: i64,
    /// How far in the future a signature timestamp may be, in seconds.
    pub max_clock_skew_secs: i64,
    /// API version the integration was written against. Informational only.
    pub expected_api_version: Option<String>,
    /// Reject events with `livemode: false`.
    pub require_livemode: bool,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self {
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            max_clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            expected_api_version: None,
            require_livemode: false,
        }
    }
}

/// Verifier for Stripe webhook signatures.
pub struct StripeWebhookVerifier {
    /// The webhook signing secret from the Stripe dashboard.
    secret: SecretString,
    settings: VerifierSettings,
}

impl StripeWebhookVerifier {
    /// Creates a verifier with default tolerances.
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_settings(secret, VerifierSettings::default())
    }

    /// Creates a verifier with explicit tolerances.
    pub fn with_settings(secret: impl Into<String>, settings: VerifierSettings) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            settings,
        }
    }

    /// Verifies the webhook signature and parses the event.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the signature header
    /// 2. Validate timestamp is within the tolerance window
    /// 3. Compute expected signature over `"{t}." ++ payload`
    /// 4. Compare against every v1 signature in constant time
    /// 5. Parse the JSON payload into a StripeEvent
    ///
    /// # Errors
    ///
    /// - `SignatureHeader` - Header missing parts or not parseable
    /// - `TimestampOutOfRange` - Signature older than the tolerance
    /// - `InvalidTimestamp` - Signature timestamp too far in the future
    /// - `InvalidSignature` - No v1 signature matched
    /// - `ParseError` - Authentic body is not an event envelope
    /// - `TestModeRejected` - Test mode event while live mode is required
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        self.verify_and_parse_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    /// Same as [`verify_and_parse`](Self::verify_and_parse) with an explicit clock.
    pub fn verify_and_parse_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp, now)?;

        let expected = self.compute_signature(header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        if self.settings.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Rejected test mode event");
            return Err(WebhookError::TestModeRejected);
        }

        if let (Some(expected), Some(actual)) = (
            self.settings.expected_api_version.as_deref(),
            event.api_version.as_deref(),
        ) {
            if expected != actual {
                tracing::debug!(
                    event_id = %event.id,
                    expected_api_version = expected,
                    api_version = actual,
                    "Accepting event rendered with a different API version"
                );
            }
        }

        Ok(event)
    }

    /// Validates that the timestamp is within acceptable bounds.
    ///
    /// `timestamp` is unauthenticated at this point, so the age is computed
    /// with checked arithmetic.
    fn validate_timestamp(&self, timestamp: i64, now: i64) -> Result<(), WebhookError> {
        let age = now
            .checked_sub(timestamp)
            .ok_or(WebhookError::TimestampOutOfRange)?;

        if age > self.settings.tolerance_secs {
            return Err(WebhookError::TimestampOutOfRange);
        }

        if age < self.settings.max_clock_skew_secs.saturating_neg() {
            return Err(WebhookError::InvalidTimestamp);
        }

        Ok(())
    }

    /// Computes the HMAC-SHA256 signature over the exact payload bytes.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a valid `Stripe-Signature` header value for a payload.
///
/// Used by tests and by local tooling that replays captured events.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return format!("t={}", timestamp),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    )
}
