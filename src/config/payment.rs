//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::billing::{
    StripeWebhookVerifier, VerifierSettings, DEFAULT_CLOCK_SKEW_SECS, DEFAULT_TOLERANCE_SECS,
};

/// Payment configuration (Stripe webhooks)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe webhook signing secret (whsec_...)
    pub stripe_webhook_secret: SecretString,

    /// Maximum age of a signature, in seconds
    #[serde(default = "default_tolerance")]
    pub signature_tolerance_secs: i64,

    /// How far a signature timestamp may lie in the future, in seconds
    #[serde(default = "default_clock_skew")]
    pub max_clock_skew_secs: i64,

    /// API version the endpoint was registered with. Informational only.
    #[serde(default)]
    pub expected_api_version: Option<String>,

    /// Reject test mode events
    #[serde(default)]
    pub require_livemode: bool,
}

impl PaymentConfig {
    pub fn new(stripe_webhook_secret: impl Into<String>) -> Self {
        Self {
            stripe_webhook_secret: SecretString::new(stripe_webhook_secret.into()),
            signature_tolerance_secs: default_tolerance(),
            max_clock_skew_secs: default_clock_skew(),
            expected_api_version: None,
            require_livemode: false,
        }
    }

    /// Builds the webhook verifier for this configuration.
    pub fn verifier(&self) -> StripeWebhookVerifier {
        StripeWebhookVerifier::with_settings(
            self.stripe_webhook_secret.expose_secret().clone(),
            VerifierSettings {
                tolerance_secs: self.signature_tolerance_secs,
                max_clock_skew_secs: self.max_clock_skew_secs,
                expected_api_version: self.expected_api_version.clone(),
                require_livemode: self.require_livemode,
            },
        )
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let secret = self.stripe_webhook_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_WEBHOOK_SECRET"));
        }
        if !secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if self.signature_tolerance_secs <= 0 || self.max_clock_skew_secs < 0 {
            return Err(ValidationError::InvalidSignatureTolerance);
        }
        Ok(())
    }
}

fn default_tolerance() -> i64 {
    DEFAULT_TOLERANCE_SECS
}

fn default_clock_skew() -> i64 {
    DEFAULT_CLOCK_SKEW_SECS
}
