//! The cache-aside result store.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::{BackendKind, CacheBackend, CacheConfig, MemoryBackend, RedisBackend};
use crate::telemetry;
use crate::types::{CheckStatus, SentimentResult};

/// Stores [`SentimentResult`]s under their text fingerprint.
///
/// Either enabled (holding a backend that answered the startup probe) or
/// disabled for the lifetime of the process. No operation on this type
/// returns an error: backend failures are logged, counted, and reported
/// as a miss or a failed write.
pub struct ResultCache {
    backend: Option<Arc<dyn CacheBackend>>,
    ttl: Duration,
}

impl ResultCache {
    /// Build the configured backend and probe it.
    ///
    /// Any failure here (unreachable server, timeout, failed `PING`)
    /// yields a disabled cache rather than an error.
    pub async fn connect(config: &CacheConfig) -> Self {
        let backend: Arc<dyn CacheBackend> = match config.backend {
            BackendKind::Disabled => {
                info!("result cache disabled by configuration");
                return Self::disabled();
            }
            BackendKind::Memory => Arc::new(MemoryBackend::new(config.max_entries)),
            BackendKind::Redis => match RedisBackend::connect(config).await {
                Ok(backend) => Arc::new(backend),
                Err(e) => {
                    error!(error = %e, url = %config.redis_url(), "failed to connect to redis, caching disabled");
                    return Self::disabled();
                }
            },
        };
        Self::with_backend(backend, config.ttl).await
    }

    /// Wrap an existing backend, probing it once.
    pub async fn with_backend(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        match backend.ping().await {
            Ok(()) => {
                info!(backend = backend.name(), ttl_secs = ttl.as_secs(), "result cache enabled");
                Self {
                    backend: Some(backend),
                    ttl,
                }
            }
            Err(e) => {
                error!(backend = backend.name(), error = %e, "cache probe failed, caching disabled");
                Self::disabled()
            }
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            ttl: Duration::ZERO,
        }
    }

    /// Whether the startup probe succeeded.
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.as_ref().map_or("disabled", |b| b.name())
    }

    /// Key of the cache entry in the health report.
    ///
    /// `redis` for the Redis backend and for a disabled cache, so the
    /// report keeps the `checks.redis` field monitoring reads; other
    /// backends report under their own name.
    pub fn check_name(&self) -> &str {
        match self.backend.as_ref() {
            None => "redis",
            Some(backend) => backend.name(),
        }
    }

    /// Configured time-to-live for new entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a result. Backend errors and undecodable payloads are misses.
    pub async fn get(&self, key: &str) -> Option<SentimentResult> {
        let backend = self.backend.as_ref()?;
        let payload = match backend.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "cache read error");
                metrics::counter!(telemetry::CACHE_ERRORS_TOTAL, "operation" => "get").increment(1);
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                return None;
            }
        };
        match serde_json::from_str(&payload) {
            Ok(result) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(result)
            }
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable cache entry");
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Store a result with the configured TTL.
    pub async fn set(&self, key: &str, result: &SentimentResult) -> bool {
        self.set_with_ttl(key, result, self.ttl).await
    }

    /// Store a result, best-effort. Returns whether the write landed.
    pub async fn set_with_ttl(&self, key: &str, result: &SentimentResult, ttl: Duration) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        let payload = match serde_json::to_string(result) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "failed to encode result for cache");
                return false;
            }
        };
        match backend.set_ex(key, &payload, ttl).await {
            Ok(()) => {
                debug!(key, ttl_secs = ttl.as_secs(), "cached result");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "cache write error");
                metrics::counter!(telemetry::CACHE_ERRORS_TOTAL, "operation" => "set").increment(1);
                false
            }
        }
    }

    /// Live health check: pings the backend on every call.
    pub async fn probe(&self) -> CheckStatus {
        match self.backend.as_ref() {
            None => CheckStatus::Unavailable,
            Some(backend) => match backend.ping().await {
                Ok(()) => CheckStatus::Healthy,
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "cache health probe failed");
                    CheckStatus::Unhealthy
                }
            },
        }
    }
}
