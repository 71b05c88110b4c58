//! Server configuration

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment name
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Rust log filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for local development
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers
    Json,
}

impl ServerConfig {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidBindAddress)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        self.socket_addr()?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,webhook_bridge=debug,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
