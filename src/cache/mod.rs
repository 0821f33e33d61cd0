//! Result caching subsystem.
//!
//! [`ResultCache`] is the cache-aside store the prediction orchestrators
//! consult. It sits over a pluggable [`CacheBackend`]:
//!
//! - [`RedisBackend`] — shared Redis instance, `GET`/`SETEX`/`PING`.
//!   Survives restarts and is shared between replicas.
//! - [`MemoryBackend`] — in-process moka cache with per-entry TTL. Useful
//!   for single-node deployments and tests.
//!
//! When no backend is configured, or the startup probe fails, the result
//! cache runs in disabled mode for the rest of the process: every lookup
//! misses and every write is a no-op. Backend failures during normal
//! operation are swallowed per call and only show up in logs, metrics and
//! the health report.

mod memory;
mod redis;
mod result;

pub use memory::MemoryBackend;
pub use self::redis::RedisBackend;
pub use result::ResultCache;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::Result;

/// Key/value store with per-key expiry.
///
/// Implementations must be safe for concurrent use; the result cache holds
/// one backend for the whole process and calls it from every request.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Fetch a value. `Ok(None)` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl`, overwriting any previous value.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Liveness probe.
    async fn ping(&self) -> Result<()>;
}

/// Which backend the result cache should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Redis,
    Memory,
    Disabled,
}

impl std::str::FromStr for BackendKind {
    type Err = crate::MoodringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(BackendKind::Redis),
            "memory" => Ok(BackendKind::Memory),
            "disabled" | "none" => Ok(BackendKind::Disabled),
            other => Err(crate::MoodringError::Configuration(format!(
                "unknown cache backend '{other}' (expected redis, memory or disabled)"
            ))),
        }
    }
}

/// Configuration for the result cache.
///
/// ```rust
/// # use moodring::cache::{BackendKind, CacheConfig};
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .backend(BackendKind::Memory)
///     .ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: BackendKind,
    /// Redis host. Default: localhost.
    pub host: String,
    /// Redis port. Default: 6379.
    pub port: u16,
    /// Redis database index. Default: 0.
    pub db: i64,
    /// Time-to-live for cached results. Default: 1 hour.
    pub ttl: Duration,
    /// Bound on connecting and probing at startup. Default: 5s.
    pub connect_timeout: Duration,
    /// Bound on each get/set/ping. Default: 1s.
    pub op_timeout: Duration,
    /// Capacity of the memory backend. Default: 10,000.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            ttl: Duration::from_secs(3600),
            connect_timeout: Duration::from_secs(5),
            op_timeout: Duration::from_secs(1),
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn redis(mut self, host: impl Into<String>, port: u16, db: i64) -> Self {
        self.host = host.into();
        self.port = port;
        self.db = db;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }

    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Connection URL for the Redis backend.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}
