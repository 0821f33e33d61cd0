//! Health aggregation.

use std::collections::BTreeMap;

use chrono::Utc;

use super::SentimentService;
use crate::types::{CheckStatus, HealthStatus, OverallStatus};
use crate::version::{SERVICE_NAME, version_string};

impl SentimentService {
    /// Compose the service health from its dependencies.
    ///
    /// Only a missing model makes the service `unhealthy`; a cache that is
    /// disabled or failing its ping degrades it. Pings the cache backend,
    /// so the report reflects the backend's current reachability. The
    /// cache check is keyed by [`ResultCache::check_name`].
    ///
    /// [`ResultCache::check_name`]: crate::cache::ResultCache::check_name
    pub async fn health(&self) -> HealthStatus {
        let model = self.gateway().status();
        let cache = self.cache().probe().await;

        let status = if model != CheckStatus::Healthy {
            OverallStatus::Unhealthy
        } else if cache != CheckStatus::Healthy {
            OverallStatus::Degraded
        } else {
            OverallStatus::Healthy
        };

        let mut checks = BTreeMap::new();
        checks.insert("model".to_string(), model);
        checks.insert(self.cache().check_name().to_string(), cache);

        HealthStatus {
            status,
            timestamp: Utc::now(),
            checks,
            service: SERVICE_NAME.to_string(),
            version: version_string(),
        }
    }
}
