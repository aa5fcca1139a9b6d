//! ClusterFlow cache orchestration
//!
//! Read-through caching with per-resource-class TTLs and mutation-triggered
//! invalidation, applied uniformly across provider adapters. Caching is an
//! optimization, not a correctness requirement: a store error, a miss, or a
//! deserialization mismatch always falls through to the live path, and a
//! failed write or invalidation is logged and ignored.

pub mod key;
pub mod store;
pub mod ttl;

pub use key::CacheKey;
pub use store::{CacheError, CacheStore, MemoryStore};
pub use ttl::{TtlOverrides, TtlPolicy};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Read-through cache front. Wraps a [`CacheStore`] with the swallow-errors
/// policy described in the module docs.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    pub ttl: TtlPolicy,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: TtlPolicy) -> Self {
        Self { store, ttl }
    }

    /// In-memory cache with default TTLs, used in tests and as a fallback.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), TtlPolicy::default())
    }

    /// Look up `key`. Store errors and type mismatches are treated as misses.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    // Stale shape from an older release; treat as a miss
                    tracing::warn!("cache value for {} failed to decode: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("cache read for {} failed: {}", key, e);
                None
            }
        }
    }

    /// Store `value` under `key`. Failures are logged and ignored.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let encoded = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("cache encode for {} failed: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.set(key, encoded, ttl).await {
            tracing::warn!("cache write for {} failed: {}", key, e);
        }
    }

    /// Delete the given keys. Failures are logged and ignored; a stale entry
    /// is an acceptable transient cost, a failed mutation is not.
    pub async fn invalidate(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.store.delete(key).await {
                tracing::warn!("cache invalidation for {} failed: {}", key, e);
            } else {
                tracing::debug!("cache invalidated: {}", key);
            }
        }
    }

    /// Read-through: return the cached value for `key` if present, otherwise
    /// run `fetch`, cache a successful result under `ttl`, and return it.
    /// Fetch errors propagate unchanged; cache errors never do.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key).await {
            tracing::debug!("cache hit: {}", key);
            return Ok(hit);
        }

        let value = fetch().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_read_through_populates_on_miss() {
        let cache = Cache::in_memory();
        let calls = AtomicUsize::new(0);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::convert::Infallible>(Payload {
                name: "prod".to_string(),
                count: 3,
            })
        };

        let first = cache
            .get_or_fetch("list:kubernetes:aws:cred-1", Duration::from_secs(60), fetch)
            .await
            .unwrap();
        assert_eq!(first.count, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Second read is served from cache
        let second = cache
            .get_or_fetch("list:kubernetes:aws:cred-1", Duration::from_secs(60), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, std::convert::Infallible>(Payload {
                    name: "other".to_string(),
                    count: 9,
                })
            })
            .await
            .unwrap();
        assert_eq!(second.name, "prod");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_is_not_cached() {
        let cache = Cache::in_memory();

        let result: Result<Payload, &str> = cache
            .get_or_fetch("item:kubernetes:aws:cred-1:prod", Duration::from_secs(60), || async {
                Err("provider down")
            })
            .await;
        assert!(result.is_err());

        assert!(cache.get::<Payload>("item:kubernetes:aws:cred-1:prod").await.is_none());
    }

    #[tokio::test]
    async fn test_type_mismatch_is_a_miss() {
        let cache = Cache::in_memory();
        cache
            .set("aws:regions:cred-1", &vec!["us-east-1".to_string()], Duration::from_secs(60))
            .await;

        assert!(cache.get::<Payload>("aws:regions:cred-1").await.is_none());
        // The original shape is still readable
        assert_eq!(
            cache.get::<Vec<String>>("aws:regions:cred-1").await.unwrap(),
            vec!["us-east-1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_invalidate_then_miss() {
        let cache = Cache::in_memory();
        let key = "list:kubernetes:aws:cred-1:us-east-1".to_string();

        cache
            .set(&key, &Payload { name: "a".to_string(), count: 1 }, Duration::from_secs(60))
            .await;
        assert!(cache.get::<Payload>(&key).await.is_some());

        cache.invalidate(std::slice::from_ref(&key)).await;
        assert!(cache.get::<Payload>(&key).await.is_none());
    }
}
