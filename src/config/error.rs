//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address")]
    InvalidBindAddress,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Signature tolerance must be positive")]
    InvalidSignatureTolerance,

    #[error("Invalid downstream base URL")]
    InvalidDownstreamUrl,

    #[error("Downstream base URL must use HTTPS in production")]
    DownstreamMustBeHttps,

    #[error("Downstream timeout must be between 1 and 300 seconds")]
    InvalidDownstreamTimeout,

    #[error("Audit write timeout must be positive")]
    InvalidAuditTimeout,

    #[error("Audit retention must be at least one day")]
    InvalidRetention,
}
