//! Key-value cache client for session state and rate-limit counters.
//!
//! Wraps a multiplexed Redis connection behind the handful of primitives the
//! auth flow needs. All correctness around per-key counters relies on the
//! server-side atomicity of `INCR`, not on in-process locking.

use anyhow::{Context, Result};
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::{info_span, Instrument};

#[derive(Clone)]
pub struct SessionCache {
    manager: ConnectionManager,
}

impl SessionCache {
    /// Connect to the cache and keep a reconnecting multiplexed connection.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the initial connection fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url).context("invalid cache URL")?;
        let manager = ConnectionManager::new(client)
            .await
            .context("failed to connect to cache")?;
        Ok(Self { manager })
    }

    /// Fetch a value, `None` when the key is missing or expired.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let span = info_span!("cache.command", db.system = "redis", db.operation = "GET");
        let mut conn = self.manager.clone();
        conn.get(key)
            .instrument(span)
            .await
            .context("failed to read from cache")
    }

    /// Store a value with a per-entry TTL.
    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let span = info_span!("cache.command", db.system = "redis", db.operation = "SETEX");
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .instrument(span)
            .await
            .context("failed to write to cache")
    }

    /// Delete a key. Deleting a missing key is not an error.
    pub async fn del(&self, key: &str) -> Result<()> {
        let span = info_span!("cache.command", db.system = "redis", db.operation = "DEL");
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key)
            .instrument(span)
            .await
            .context("failed to delete from cache")
    }

    /// Atomically increment a counter, returning the post-increment value.
    /// A missing key counts up from zero.
    pub async fn incr(&self, key: &str) -> Result<i64> {
        let span = info_span!("cache.command", db.system = "redis", db.operation = "INCR");
        let mut conn = self.manager.clone();
        conn.incr(key, 1i64)
            .instrument(span)
            .await
            .context("failed to increment counter")
    }

    /// Set a TTL on an existing key.
    pub async fn expire(&self, key: &str, ttl_seconds: i64) -> Result<()> {
        let span = info_span!("cache.command", db.system = "redis", db.operation = "EXPIRE");
        let mut conn = self.manager.clone();
        conn.expire::<_, ()>(key, ttl_seconds)
            .instrument(span)
            .await
            .context("failed to set expiration")
    }

    /// Round-trip liveness check, used by the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        let span = info_span!("cache.command", db.system = "redis", db.operation = "PING");
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .instrument(span)
            .await
            .context("failed to ping cache")?;
        Ok(())
    }
}
