//! Memoized Query Module
//!
//! Compute-if-absent on top of [`CacheStore`].

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::CacheStore;

// == Memoized Query ==
/// Runs a producer only when its result is not already cached.
///
/// There is no per-key locking: two callers missing the same key at the
/// same time both run their producer, and the last write wins.
#[derive(Debug, Clone)]
pub struct MemoizedQuery {
    store: Arc<CacheStore>,
}

impl MemoizedQuery {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }

    // == Query ==
    /// Returns the cached value for `key`, or runs `producer` and caches its result.
    ///
    /// Producer errors are returned unchanged and nothing is cached. A failed
    /// cache write is logged and the fresh value is still returned.
    pub fn query<T, E, F>(&self, key: &str, producer: F, ttl_seconds: u64) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(hit) = self.store.get(key) {
            debug!(key, "Cache hit");
            return Ok(hit);
        }

        let value = producer()?;
        self.remember(key, &value, ttl_seconds);
        Ok(value)
    }

    /// Async form of [`MemoizedQuery::query`] for future-returning producers.
    ///
    /// Cache file I/O runs on the blocking pool so the calling runtime thread
    /// only waits on the producer.
    pub async fn query_async<T, E, F, Fut>(
        &self,
        key: &str,
        producer: F,
        ttl_seconds: u64,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let store = self.store.clone();
        let lookup = key.to_string();
        match tokio::task::spawn_blocking(move || store.get::<T>(&lookup)).await {
            Ok(Some(hit)) => {
                debug!(key, "Cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(err) => warn!(key, error = %err, "Cache lookup task failed, treating as miss"),
        }

        let value = producer().await?;
        debug!(key, ttl_seconds, "Cache miss, storing fresh value");
        // The snapshot lets the write move to the blocking pool while the
        // caller keeps the original value.
        let snapshot = serde_json::to_value(&value);
        match snapshot {
            Ok(snapshot) => self.write_snapshot(key, snapshot, ttl_seconds).await,
            Err(err) => warn!(key, error = %err, "Failed to cache computed value"),
        }
        Ok(value)
    }

    async fn write_snapshot(&self, key: &str, snapshot: serde_json::Value, ttl_seconds: u64) {
        let store = self.store.clone();
        let owned_key = key.to_string();
        let written =
            tokio::task::spawn_blocking(move || store.set(&owned_key, &snapshot, ttl_seconds)).await;
        match written {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(key, error = %err, "Failed to cache computed value"),
            Err(err) => warn!(key, error = %err, "Cache write task failed"),
        }
    }

    fn remember<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        debug!(key, ttl_seconds, "Cache miss, storing fresh value");
        if let Err(err) = self.store.set(key, value, ttl_seconds) {
            warn!(key, error = %err, "Failed to cache computed value");
        }
    }
}
