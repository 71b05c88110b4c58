//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `WEBHOOK_BRIDGE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use webhook_bridge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod audit;
mod database;
mod downstream;
mod error;
mod payment;
mod server;

pub use audit::AuditConfig;
pub use database::DatabaseConfig;
pub use downstream::DownstreamConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

/// Environment variable prefix for all settings.
pub const ENV_PREFIX: &str = "WEBHOOK_BRIDGE";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Stripe webhook verification
    pub payment: PaymentConfig,

    /// Downstream application API
    pub downstream: DownstreamConfig,

    /// Audit log behaviour
    #[serde(default)]
    pub audit: AuditConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `WEBHOOK_BRIDGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `WEBHOOK_BRIDGE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `WEBHOOK_BRIDGE__PAYMENT__STRIPE_WEBHOOK_SECRET=whsec_...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Same as [`load`](Self::load) without reading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.downstream.validate(self.server.is_production())?;
        self.audit.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; tests touching them must not overlap.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "WEBHOOK_BRIDGE__DATABASE__URL",
        "WEBHOOK_BRIDGE__PAYMENT__STRIPE_WEBHOOK_SECRET",
        "WEBHOOK_BRIDGE__DOWNSTREAM__BASE_URL",
        "WEBHOOK_BRIDGE__DOWNSTREAM__API_KEY",
        "WEBHOOK_BRIDGE__SERVER__PORT",
        "WEBHOOK_BRIDGE__SERVER__ENVIRONMENT",
        "WEBHOOK_BRIDGE__SERVER__LOG_FORMAT",
        "WEBHOOK_BRIDGE__PAYMENT__SIGNATURE_TOLERANCE_SECS",
        "WEBHOOK_BRIDGE__AUDIT__RETENTION_DAYS",
    ];

    fn set_minimal_env() {
        env::set_var("WEBHOOK_BRIDGE__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("WEBHOOK_BRIDGE__PAYMENT__STRIPE_WEBHOOK_SECRET", "whsec_xxx");
        env::set_var("WEBHOOK_BRIDGE__DOWNSTREAM__BASE_URL", "https://app.example.com");
        env::set_var("WEBHOOK_BRIDGE__DOWNSTREAM__API_KEY", "key_xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::from_env();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.payment.stripe_webhook_secret.expose_secret(), "whsec_xxx");
        assert_eq!(config.downstream.base_url, "https://app.example.com");
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::from_env();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn test_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.payment.signature_tolerance_secs, 300);
        assert_eq!(config.downstream.timeout_secs, 30);
        assert_eq!(config.audit.write_timeout_ms, 5000);
    }

    #[test]
    fn test_overrides_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("WEBHOOK_BRIDGE__SERVER__PORT", "3000");
        env::set_var("WEBHOOK_BRIDGE__SERVER__LOG_FORMAT", "json");
        env::set_var("WEBHOOK_BRIDGE__PAYMENT__SIGNATURE_TOLERANCE_SECS", "600");
        env::set_var("WEBHOOK_BRIDGE__AUDIT__RETENTION_DAYS", "90");
        let result = AppConfig::from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.payment.signature_tolerance_secs, 600);
        assert_eq!(config.audit.retention_days, Some(90));
    }

    #[test]
    fn test_production_requires_https_downstream() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("WEBHOOK_BRIDGE__SERVER__ENVIRONMENT", "production");
        env::set_var("WEBHOOK_BRIDGE__DOWNSTREAM__BASE_URL", "http://backend.internal");
        let result = AppConfig::from_env();
        clear_env();

        let config = result.unwrap();
        assert!(config.server.is_production());
        assert_eq!(config.validate(), Err(ValidationError::DownstreamMustBeHttps));
    }

    #[test]
    fn test_missing_webhook_secret_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::remove_var("WEBHOOK_BRIDGE__PAYMENT__STRIPE_WEBHOOK_SECRET");
        let result = AppConfig::from_env();
        clear_env();

        assert!(result.is_err());
    }
}
