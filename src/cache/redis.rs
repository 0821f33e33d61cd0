//! Redis cache backend.

use std::future::Future;
use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::{Client, RedisResult};
use async_trait::async_trait;
use tracing::info;

use super::{CacheBackend, CacheConfig};
use crate::{MoodringError, Result};

/// Backend over a shared Redis instance.
///
/// Holds a [`ConnectionManager`], which multiplexes one connection across
/// all callers and reconnects on its own after transient failures. Every
/// command is bounded by the configured operation timeout so a stalled
/// server cannot block request handlers.
pub struct RedisBackend {
    manager: ConnectionManager,
    op_timeout: Duration,
}

impl RedisBackend {
    /// Connect and verify the server answers `PING`, within the connect timeout.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let url = config.redis_url();
        let client = Client::open(url.as_str())?;
        let manager = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                MoodringError::Cache(format!(
                    "connecting to {url} timed out after {:?}",
                    config.connect_timeout
                ))
            })??;

        let backend = Self {
            manager,
            op_timeout: config.op_timeout,
        };
        backend.ping().await?;
        info!(host = %config.host, port = config.port, db = config.db, "connected to redis");
        Ok(backend)
    }

    async fn bounded<T>(&self, command: impl Future<Output = RedisResult<T>>) -> Result<T> {
        tokio::time::timeout(self.op_timeout, command)
            .await
            .map_err(|_| {
                MoodringError::Cache(format!(
                    "redis command timed out after {:?}",
                    self.op_timeout
                ))
            })?
            .map_err(MoodringError::from)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        self.bounded(
            ::redis::cmd("GET")
                .arg(key)
                .query_async::<_, Option<String>>(&mut conn),
        )
        .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.manager.clone();
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        self.bounded(
            ::redis::cmd("SETEX")
                .arg(key)
                .arg(seconds)
                .arg(value)
                .query_async::<_, ()>(&mut conn),
        )
        .await
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        self.bounded(::redis::cmd("PING").query_async::<_, String>(&mut conn))
            .await
            .map(|_| ())
    }
}
