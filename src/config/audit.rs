//! Audit log configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Audit log configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Bound on a single audit write, in milliseconds
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,

    /// Delete audit rows older than this many days at startup
    #[serde(default)]
    pub retention_days: Option<u32>,
}

impl AuditConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.write_timeout_ms == 0 {
            return Err(ValidationError::InvalidAuditTimeout);
        }
        if self.retention_days == Some(0) {
            return Err(ValidationError::InvalidRetention);
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: default_write_timeout(),
            retention_days: None,
        }
    }
}

fn default_write_timeout() -> u64 {
    5000
}
