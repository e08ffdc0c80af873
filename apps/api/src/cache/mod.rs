//! Read-through lookup cache with TTL freshness and fail-open fallback.
//!
//! A fresh entry short-circuits the network entirely. A miss or stale entry
//! triggers the fetch; success overwrites the entry, failure falls back to
//! whatever is stored under the key — regardless of age — and only propagates
//! when nothing is stored at all. Malformed stored payloads count as absent.

pub mod store;

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::opportunity::OpportunityFeed;
use store::KeyedStore;

const CITIES_TTL_HOURS: i64 = 24;
const OPPORTUNITIES_TTL_HOURS: i64 = 1;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Lookup for '{key}' failed with no cached fallback: {message}")]
    FetchFailed { key: String, message: String },
}

/// One stored value with its write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub timestamp: DateTime<Utc>,
}

/// Generic read-through cache over a [`KeyedStore`].
pub struct LookupCache<T> {
    store: Arc<dyn KeyedStore>,
    /// Prepended to every lookup key to form the storage key.
    prefix: &'static str,
    ttl: Duration,
    _value: PhantomData<fn() -> T>,
}

/// Regional-city cache: `cities_cache_<country>`, fresh for 24 hours.
pub fn cities_cache(store: Arc<dyn KeyedStore>) -> LookupCache<Vec<String>> {
    LookupCache::new(store, "cities_cache_", Duration::hours(CITIES_TTL_HOURS))
}

/// Opportunity-feed cache: a single fixed key, fresh for 1 hour.
pub fn opportunities_cache(store: Arc<dyn KeyedStore>) -> LookupCache<OpportunityFeed> {
    LookupCache::new(
        store,
        "live_opportunities_cache",
        Duration::hours(OPPORTUNITIES_TTL_HOURS),
    )
}

impl<T> LookupCache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyedStore>, prefix: &'static str, ttl: Duration) -> Self {
        LookupCache {
            store,
            prefix,
            ttl,
            _value: PhantomData,
        }
    }

    /// Returns the cached value for `key` if fresh, otherwise runs `fetch`.
    /// A successful fetch overwrites the entry; a failed fetch falls back to
    /// any stored entry (even expired) before propagating.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<T, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let storage_key = format!("{}{}", self.prefix, key);

        if let Some(entry) = self.read_entry(&storage_key).await {
            let age = Utc::now() - entry.timestamp;
            if age < self.ttl {
                debug!("Cache hit for '{storage_key}' (age {}s)", age.num_seconds());
                return Ok(entry.value);
            }
        }

        match fetch().await {
            Ok(value) => {
                self.write_entry(&storage_key, &value).await;
                Ok(value)
            }
            Err(e) => {
                warn!("Lookup for '{storage_key}' failed, trying cached fallback: {e}");
                if let Some(entry) = self.read_entry(&storage_key).await {
                    return Ok(entry.value);
                }
                Err(CacheError::FetchFailed {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Reads and decodes an entry. Store failures and undecodable payloads
    /// both count as cache-absent.
    async fn read_entry(&self, storage_key: &str) -> Option<CacheEntry<T>> {
        let raw = match self.store.read(storage_key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Could not read cache entry '{storage_key}': {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Discarding malformed cache entry '{storage_key}': {e}");
                None
            }
        }
    }

    /// Writes an entry stamped with the current time. Write failures are
    /// logged and swallowed — the fetched value is still returned to the
    /// caller.
    async fn write_entry(&self, storage_key: &str, value: &T) {
        let entry = CacheEntry {
            value,
            timestamp: Utc::now(),
        };
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not encode cache entry '{storage_key}': {e}");
                return;
            }
        };
        if let Err(e) = self.store.write(storage_key, &raw).await {
            warn!("Could not write cache entry '{storage_key}': {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::store::{MemoryStore, StoreError};
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_fetch<'a>(
        counter: &'a AtomicUsize,
        result: Result<Vec<String>, &'static str>,
    ) -> impl Future<Output = Result<Vec<String>, &'static str>> + 'a {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { result }
    }

    async fn seed_entry(store: &MemoryStore, storage_key: &str, cities: &[&str], age: Duration) {
        let entry = CacheEntry {
            value: cities.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            timestamp: Utc::now() - age,
        };
        store
            .write(storage_key, &serde_json::to_string(&entry).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_second_get_within_ttl_skips_fetch() {
        let store = Arc::new(MemoryStore::new());
        let cache = cities_cache(store);
        let fetches = AtomicUsize::new(0);

        let cities = vec!["Da Nang".to_string(), "Haiphong".to_string()];
        let first = cache
            .get_or_fetch("Vietnam", || counting_fetch(&fetches, Ok(cities.clone())))
            .await
            .unwrap();
        assert_eq!(first, cities);

        let second = cache
            .get_or_fetch("Vietnam", || counting_fetch(&fetches, Ok(vec![])))
            .await
            .unwrap();
        assert_eq!(second, cities);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_refetch_and_overwrite() {
        let store = Arc::new(MemoryStore::new());
        seed_entry(&store, "cities_cache_Vietnam", &["Old Town"], Duration::hours(25)).await;
        let cache = cities_cache(store.clone());
        let fetches = AtomicUsize::new(0);

        let fresh = vec!["Da Nang".to_string()];
        let result = cache
            .get_or_fetch("Vietnam", || counting_fetch(&fetches, Ok(fresh.clone())))
            .await
            .unwrap();
        assert_eq!(result, fresh);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        // The stale entry was silently superseded.
        let raw = store.read("cities_cache_Vietnam").await.unwrap().unwrap();
        let entry: CacheEntry<Vec<String>> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entry.value, fresh);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_expired_entry() {
        let store = Arc::new(MemoryStore::new());
        seed_entry(&store, "cities_cache_Vietnam", &["Old Town"], Duration::hours(25)).await;
        let cache = cities_cache(store);
        let fetches = AtomicUsize::new(0);

        let result = cache
            .get_or_fetch("Vietnam", || counting_fetch(&fetches, Err("network down")))
            .await
            .unwrap();
        assert_eq!(result, vec!["Old Town".to_string()]);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_with_no_entry_propagates() {
        let store = Arc::new(MemoryStore::new());
        let cache = cities_cache(store);
        let fetches = AtomicUsize::new(0);

        let result = cache
            .get_or_fetch("Vietnam", || counting_fetch(&fetches, Err("network down")))
            .await;
        match result {
            Err(CacheError::FetchFailed { key, message }) => {
                assert_eq!(key, "Vietnam");
                assert!(message.contains("network down"));
            }
            Ok(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_malformed_entry_counts_as_absent() {
        let store = Arc::new(MemoryStore::new());
        store
            .write("cities_cache_Vietnam", "{not json")
            .await
            .unwrap();
        let cache = cities_cache(store);
        let fetches = AtomicUsize::new(0);

        // Malformed payload must not mask the fetch...
        let fresh = vec!["Da Nang".to_string()];
        let result = cache
            .get_or_fetch("Vietnam", || counting_fetch(&fetches, Ok(fresh.clone())))
            .await
            .unwrap();
        assert_eq!(result, fresh);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_entry_is_no_fallback_on_failure() {
        let store = Arc::new(MemoryStore::new());
        store
            .write("cities_cache_Vietnam", "\"cities\": 42")
            .await
            .unwrap();
        let cache = cities_cache(store);
        let fetches = AtomicUsize::new(0);

        let result = cache
            .get_or_fetch("Vietnam", || counting_fetch(&fetches, Err("boom")))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = Arc::new(MemoryStore::new());
        let cache = cities_cache(store);
        let fetches = AtomicUsize::new(0);

        cache
            .get_or_fetch("Vietnam", || {
                counting_fetch(&fetches, Ok(vec!["Da Nang".to_string()]))
            })
            .await
            .unwrap();
        let result = cache
            .get_or_fetch("Philippines", || {
                counting_fetch(&fetches, Ok(vec!["Cebu".to_string()]))
            })
            .await
            .unwrap();
        assert_eq!(result, vec!["Cebu".to_string()]);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyedStore for BrokenStore {
        async fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }
        async fn write(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn test_broken_store_degrades_to_plain_fetch() {
        let cache = cities_cache(Arc::new(BrokenStore));
        let fetches = AtomicUsize::new(0);

        let fresh = vec!["Cebu".to_string()];
        let result = cache
            .get_or_fetch("Philippines", || counting_fetch(&fetches, Ok(fresh.clone())))
            .await
            .unwrap();
        assert_eq!(result, fresh);
    }

    #[tokio::test]
    async fn test_opportunities_cache_uses_singleton_key() {
        let store = Arc::new(MemoryStore::new());
        let cache = opportunities_cache(store.clone());

        let feed = OpportunityFeed { items: vec![] };
        cache
            .get_or_fetch("", || async { Ok::<_, StoreError>(feed.clone()) })
            .await
            .unwrap();
        assert!(store
            .read("live_opportunities_cache")
            .await
            .unwrap()
            .is_some());
    }
}
