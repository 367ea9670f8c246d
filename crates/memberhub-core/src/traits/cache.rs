//! Cache provider trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for key/value cache backends with native per-entry expiry.
///
/// Implementations are responsible for key prefixing and for expiring each
/// entry once its own TTL elapses; callers never sweep.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value only if no live entry exists under `key`.
    ///
    /// Returns `true` when this call created the entry. The check and the
    /// insert are a single atomic step in the backend.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a live (unexpired) key exists in the cache.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
