//! Keyed storage backends for the lookup cache.
//!
//! The cache contract only needs read/write of opaque strings under a key;
//! the backend can be an in-memory map, Redis, or anything else durable.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Process-wide keyed string store. Keys are independent; concurrent writes
/// to the same key resolve last-write-wins.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store. The default backend, and the one unit tests use.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyedStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Redis-backed store, for deployments where cached lookups should survive
/// process restarts.
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(RedisStore { client })
    }
}

#[async_trait]
impl KeyedStore for RedisStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        use redis::AsyncCommands;
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        conn.get(key)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        use redis::AsyncCommands;
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.read("missing").await.unwrap(), None);

        store.write("k", "v1").await.unwrap();
        assert_eq!(store.read("k").await.unwrap(), Some("v1".to_string()));

        // Same-key writes are last-write-wins.
        store.write("k", "v2").await.unwrap();
        assert_eq!(store.read("k").await.unwrap(), Some("v2".to_string()));
    }
}
