//! Downstream application configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::downstream::{NotifierSettings, DEFAULT_USER_AGENT};

/// Downstream API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DownstreamConfig {
    /// Base URL of the downstream application
    pub base_url: String,

    /// Shared key sent in the `apikey` header
    pub api_key: SecretString,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// `User-Agent` sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl DownstreamConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: SecretString::new(api_key.into()),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Settings for the HTTP notifier.
    pub fn notifier_settings(&self) -> NotifierSettings {
        NotifierSettings::new(
            self.base_url.trim_end_matches('/'),
            self.api_key.expose_secret().clone(),
        )
        .with_timeout(self.timeout())
        .with_user_agent(self.user_agent.clone())
    }

    /// Validate downstream configuration. Production requires https.
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("DOWNSTREAM__BASE_URL"));
        }
        let is_https = self.base_url.starts_with("https://");
        if !is_https && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidDownstreamUrl);
        }
        if production && !is_https {
            return Err(ValidationError::DownstreamMustBeHttps);
        }
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("DOWNSTREAM__API_KEY"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidDownstreamTimeout);
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> DownstreamConfig {
        DownstreamConfig::new("https://app.example.com", "key_123")
    }

    #[test]
    fn test_defaults() {
        let config = valid();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid().validate(true).is_ok());
    }

    #[test]
    fn test_validation_missing_base_url() {
        let config = DownstreamConfig::new("", "key");
        assert!(config.validate(false).is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_scheme() {
        let config = DownstreamConfig::new("ftp://app.example.com", "key");
        assert_eq!(
            config.validate(false),
            Err(ValidationError::InvalidDownstreamUrl)
        );
    }

    #[test]
    fn test_plain_http_only_outside_production() {
        let config = DownstreamConfig::new("http://localhost:8000", "key");
        assert!(config.validate(false).is_ok());
        assert_eq!(
            config.validate(true),
            Err(ValidationError::DownstreamMustBeHttps)
        );
    }

    #[test]
    fn test_validation_missing_api_key() {
        let config = DownstreamConfig::new("https://app.example.com", "");
        assert_eq!(
            config.validate(false),
            Err(ValidationError::MissingRequired("DOWNSTREAM__API_KEY"))
        );
    }

    #[test]
    fn test_validation_invalid_timeout() {
        let config = DownstreamConfig {
            timeout_secs: 0,
            ..valid()
        };
        assert_eq!(
            config.validate(false),
            Err(ValidationError::InvalidDownstreamTimeout)
        );
    }

    #[test]
    fn test_notifier_settings_strip_trailing_slash() {
        let config = DownstreamConfig::new("https://app.example.com/", "key");
        assert_eq!(config.notifier_settings().base_url, "https://app.example.com");
    }
}
