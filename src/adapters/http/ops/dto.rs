//! Response bodies for operational endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
}

/// Health of one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyHealth {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DependencyHealth {
    pub fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                healthy: true,
                error: None,
            },
            Err(e) => Self {
                healthy: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Readiness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub database: DependencyHealth,
    pub downstream: DependencyHealth,
}

/// Service status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
}
