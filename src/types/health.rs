//! Health report types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    /// Serving, but without the result cache.
    Degraded,
    /// The inference backend is down; predictions cannot be served.
    Unhealthy,
}

impl OverallStatus {
    /// Whether the service should report ready to a load balancer.
    pub fn is_serving(self) -> bool {
        !matches!(self, OverallStatus::Unhealthy)
    }
}

/// Status of one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    /// Configured but failing right now.
    Unhealthy,
    /// Not configured, or disabled at startup.
    Unavailable,
}

/// Aggregated health of the service. Derived on every call, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: OverallStatus,
    /// When the report was composed (UTC).
    pub timestamp: DateTime<Utc>,
    pub checks: BTreeMap<String, CheckStatus>,
    pub service: String,
    pub version: String,
}
