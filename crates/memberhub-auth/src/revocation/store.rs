//! Cache-backed revocation list.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{error, info};

use memberhub_cache::keys;
use memberhub_core::result::AppResult;
use memberhub_core::traits::cache::CacheProvider;

use crate::error::AuthError;

/// Value stored under every revocation key.
const REVOKED: &str = "revoked";

/// Records revoked tokens until they would have expired anyway.
///
/// Entries are keyed by the SHA-256 digest of the exact token string, so a
/// lookup needs no parsing and the raw token never reaches the cache.
/// Expiry is left to the backend's own per-entry TTL. Every round-trip is
/// bounded by `timeout`; a slow or failing backend yields
/// [`AuthError::StoreUnavailable`], never "not revoked".
#[derive(Debug, Clone)]
pub struct RevocationStore {
    cache: Arc<dyn CacheProvider>,
    timeout: Duration,
}

impl RevocationStore {
    /// Creates a store over `cache` with a per-call timeout.
    pub fn new(cache: Arc<dyn CacheProvider>, timeout: Duration) -> Self {
        Self { cache, timeout }
    }

    /// Hex SHA-256 of a token's wire form.
    pub fn digest(token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }

    /// Marks `token` revoked for `ttl`. A zero TTL writes nothing.
    pub async fn put(&self, token: &str, ttl: Duration) -> Result<(), AuthError> {
        if ttl.is_zero() {
            return Ok(());
        }

        let digest = Self::digest(token);
        let key = keys::revoked_token(&digest);
        self.bounded("put", self.cache.set(&key, REVOKED, ttl))
            .await?;

        info!(
            token_digest = %&digest[..12],
            ttl_seconds = ttl.as_secs(),
            "Token revoked"
        );
        Ok(())
    }

    /// Marks `token` revoked unless it already is.
    ///
    /// Returns `true` only for the caller whose write created the entry, so
    /// a token can be consumed at most once. A zero TTL claims nothing.
    pub async fn claim(&self, token: &str, ttl: Duration) -> Result<bool, AuthError> {
        if ttl.is_zero() {
            return Ok(false);
        }

        let digest = Self::digest(token);
        let key = keys::revoked_token(&digest);
        let claimed = self
            .bounded("claim", self.cache.set_if_absent(&key, REVOKED, ttl))
            .await?;

        if claimed {
            info!(
                token_digest = %&digest[..12],
                ttl_seconds = ttl.as_secs(),
                "Token consumed"
            );
        }
        Ok(claimed)
    }

    /// Whether `token` is currently revoked.
    pub async fn contains(&self, token: &str) -> Result<bool, AuthError> {
        let key = keys::revoked_token(&Self::digest(token));
        self.bounded("lookup", self.cache.exists(&key)).await
    }

    /// Backend reachability.
    pub async fn health_check(&self) -> Result<bool, AuthError> {
        self.bounded("health check", self.cache.health_check()).await
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        call: impl Future<Output = AppResult<T>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(op, error = %e, "Revocation store call failed");
                Err(AuthError::StoreUnavailable(e.to_string()))
            }
            Err(_) => {
                error!(
                    op,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Revocation store call timed out"
                );
                Err(AuthError::StoreUnavailable(format!(
                    "{op} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use memberhub_cache::memory::MemoryCacheProvider;
    use memberhub_core::config::cache::MemoryCacheConfig;
    use memberhub_core::error::AppError;

    use super::*;

    #[derive(Debug)]
    struct DownCache;

    #[async_trait]
    impl CacheProvider for DownCache {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::cache("connection refused"))
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<bool> {
            Err(AppError::cache("connection refused"))
        }
        async fn delete(&self, _key: &str) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn exists(&self, _key: &str) -> AppResult<bool> {
            Err(AppError::cache("connection refused"))
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[derive(Debug)]
    struct StalledCache;

    #[async_trait]
    impl CacheProvider for StalledCache {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
        async fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<bool> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(true)
        }
        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }
        async fn exists(&self, _key: &str) -> AppResult<bool> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(false)
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
    }

    fn memory_store() -> RevocationStore {
        let cache = MemoryCacheProvider::new(&MemoryCacheConfig::default());
        RevocationStore::new(Arc::new(cache), Duration::from_millis(500))
    }

    #[test]
    fn test_digest_is_stable_hex() {
        let d = RevocationStore::digest("a.b.c");
        assert_eq!(d.len(), 64);
        assert_eq!(d, RevocationStore::digest("a.b.c"));
        assert_ne!(d, RevocationStore::digest("a.b.d"));
    }

    #[tokio::test]
    async fn test_put_then_contains() {
        let store = memory_store();
        assert!(!store.contains("tok").await.unwrap());
        store.put("tok", Duration::from_secs(60)).await.unwrap();
        assert!(store.contains("tok").await.unwrap());
        assert!(!store.contains("other").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_is_idempotent() {
        let store = memory_store();
        store.put("tok", Duration::from_secs(60)).await.unwrap();
        store.put("tok", Duration::from_secs(60)).await.unwrap();
        assert!(store.contains("tok").await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_succeeds_once() {
        let store = memory_store();
        assert!(store.claim("tok", Duration::from_secs(60)).await.unwrap());
        assert!(!store.claim("tok", Duration::from_secs(60)).await.unwrap());
        assert!(store.contains("tok").await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_after_put_is_refused() {
        let store = memory_store();
        store.put("tok", Duration::from_secs(60)).await.unwrap();
        assert!(!store.claim("tok", Duration::from_secs(60)).await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_not_stored() {
        let store = memory_store();
        store.put("tok", Duration::ZERO).await.unwrap();
        assert!(!store.contains("tok").await.unwrap());
    }

    #[tokio::test]
    async fn test_backend_error_fails_closed() {
        let store = RevocationStore::new(Arc::new(DownCache), Duration::from_millis(500));
        let err = store.contains("tok").await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
        assert!(err.is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_closed() {
        let store = RevocationStore::new(Arc::new(StalledCache), Duration::from_millis(500));
        let err = store.contains("tok").await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(ref m) if m.contains("timed out")));

        let err = store.put("tok", Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));

        let err = store.claim("tok", Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
    }
}
