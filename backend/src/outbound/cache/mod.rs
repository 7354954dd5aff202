//! Redis cart cache adapter.
//!
//! Implements the `CartCache` port over a `bb8-redis` pool. Values are the
//! JSON documents produced by the cart store; this adapter only moves
//! strings. Every write is `SET key value EX ttl`, so saving a cart also
//! slides its expiry forward.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::{self, RedisError};
use tracing::debug;

use crate::domain::CartKey;
use crate::domain::ports::{CartCache, CartCacheError};

/// Connection settings for the Redis pool.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use storefront::outbound::cache::RedisCacheConfig;
///
/// let config = RedisCacheConfig::new("redis://127.0.0.1:6379")
///     .with_max_size(32)
///     .with_connection_timeout(Duration::from_secs(2));
/// assert_eq!(config.max_size(), 32);
/// ```
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    redis_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl RedisCacheConfig {
    /// Configuration with defaults: 16 connections, 5 s checkout.
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            max_size: 16,
            connection_timeout: Duration::from_secs(5),
        }
    }

    /// Set the maximum number of pooled connections.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set how long checkout waits for a free connection.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Connection string.
    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }

    /// Maximum number of pooled connections.
    pub fn max_size(&self) -> u32 {
        self.max_size
    }
}

/// Redis-backed cart cache.
#[derive(Clone)]
pub struct RedisCartCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCartCache {
    /// Build the connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`CartCacheError::Backend`] when the URL is invalid or the
    /// pool cannot connect.
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, CartCacheError> {
        let manager = RedisConnectionManager::new(config.redis_url.as_str())
            .map_err(|err| CartCacheError::backend(err.to_string()))?;
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| CartCacheError::backend(err.to_string()))?;
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, CartCacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| CartCacheError::backend(err.to_string()))
    }
}

/// Transport failures are retryable outages; anything else is a command the
/// server rejected.
fn map_redis_error(error: RedisError) -> CartCacheError {
    debug!(%error, "redis command failed");
    if error.is_io_error()
        || error.is_timeout()
        || error.is_connection_dropped()
        || error.is_connection_refusal()
    {
        CartCacheError::backend(error.to_string())
    } else {
        CartCacheError::command(error.to_string())
    }
}

/// Redis rejects `EX 0`; sub-second TTLs round up to one second.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CartCache for RedisCartCache {
    async fn get(&self, key: &CartKey) -> Result<Option<String>, CartCacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("GET")
            .arg(key.as_str())
            .query_async::<Option<String>>(&mut *conn)
            .await
            .map_err(map_redis_error)
    }

    async fn set_with_ttl(
        &self,
        key: &CartKey,
        ttl: Duration,
        value: &str,
    ) -> Result<(), CartCacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(key.as_str())
            .arg(value)
            .arg("EX")
            .arg(expiry_seconds(ttl))
            .query_async::<()>(&mut *conn)
            .await
            .map_err(map_redis_error)
    }

    async fn delete(&self, key: &CartKey) -> Result<(), CartCacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("DEL")
            .arg(key.as_str())
            .query_async::<()>(&mut *conn)
            .await
            .map_err(map_redis_error)
    }
}
