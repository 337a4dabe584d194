//! Content Cache Façade
//!
//! Named entry points per kind of storefront data. Each one fixes the
//! namespace and default TTL, then goes through the key codec and the
//! memoized query.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::cache::key::{composite_key, scalar_key, singleton_key};
use crate::cache::{
    CacheStore, EntityKind, InvalidationPolicy, InvalidationReport, MemoizedQuery, Namespace,
};
use crate::config::TtlPolicy;

// == Content Cache ==
/// Storefront view of the cache.
#[derive(Debug, Clone)]
pub struct ContentCache {
    store: Arc<CacheStore>,
    memo: MemoizedQuery,
    invalidation: InvalidationPolicy,
    ttl: TtlPolicy,
}

impl ContentCache {
    pub fn new(store: Arc<CacheStore>, ttl: TtlPolicy) -> Self {
        Self {
            memo: MemoizedQuery::new(store.clone()),
            invalidation: InvalidationPolicy::new(store.clone()),
            store,
            ttl,
        }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn invalidation(&self) -> &InvalidationPolicy {
        &self.invalidation
    }

    // == Reads ==
    /// Product detail, keyed `product:<id>`.
    pub async fn product<T, E, F, Fut>(&self, id: impl Display, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = scalar_key(Namespace::Product, id);
        self.memo.query_async(&key, producer, self.ttl.product).await
    }

    /// Category listing, keyed `category:<id>`.
    pub async fn category<T, E, F, Fut>(&self, id: impl Display, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = scalar_key(Namespace::Category, id);
        self.memo.query_async(&key, producer, self.ttl.category).await
    }

    /// Search results for a query and its filters.
    ///
    /// If the filters cannot be serialized the search runs uncached.
    pub async fn search<T, E, F, Fut, Q>(&self, query: &str, filters: &Q, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        Q: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match composite_key(Namespace::Search, query, filters) {
            Ok(key) => self.memo.query_async(&key, producer, self.ttl.search).await,
            Err(err) => {
                warn!(query, error = %err, "Cannot derive search cache key, bypassing cache");
                producer().await
            }
        }
    }

    /// Homepage aggregate.
    pub async fn homepage<T, E, F, Fut>(&self, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = singleton_key(Namespace::Homepage);
        self.memo.query_async(&key, producer, self.ttl.homepage).await
    }

    /// Featured product list. Shares the homepage TTL.
    pub async fn featured<T, E, F, Fut>(&self, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = singleton_key(Namespace::Featured);
        self.memo.query_async(&key, producer, self.ttl.homepage).await
    }

    /// Category navigation tree. Shares the category TTL.
    pub async fn navigation<T, E, F, Fut>(&self, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = singleton_key(Namespace::Navigation);
        self.memo.query_async(&key, producer, self.ttl.category).await
    }

    /// Named analytics report, keyed `analytics:<report>`.
    pub async fn analytics<T, E, F, Fut>(&self, report: &str, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = scalar_key(Namespace::Analytics, report);
        self.memo.query_async(&key, producer, self.ttl.analytics).await
    }

    /// Path of an optimized/transformed asset for `source` and its variant options.
    pub async fn optimized_asset<E, F, Fut, V>(
        &self,
        source: &str,
        variant: &V,
        producer: F,
    ) -> Result<String, E>
    where
        V: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        match composite_key(Namespace::Asset, source, variant) {
            Ok(key) => self.memo.query_async(&key, producer, self.ttl.asset).await,
            Err(err) => {
                warn!(source, error = %err, "Cannot derive asset cache key, bypassing cache");
                producer().await
            }
        }
    }

    // == Invalidation ==
    pub fn invalidate(
        &self,
        kind: EntityKind,
        id: &str,
        parent_category: Option<&str>,
    ) -> InvalidationReport {
        self.invalidation.invalidate(kind, id, parent_category)
    }

    pub fn invalidate_product(&self, id: &str, category: Option<&str>) -> InvalidationReport {
        self.invalidate(EntityKind::Product, id, category)
    }

    pub fn invalidate_category(&self, id: &str, parent: Option<&str>) -> InvalidationReport {
        self.invalidate(EntityKind::Category, id, parent)
    }

    pub fn invalidate_order(&self, id: &str) -> InvalidationReport {
        self.invalidate(EntityKind::Order, id, None)
    }

    /// Drops every cached search result.
    pub fn invalidate_search(&self) -> InvalidationReport {
        self.invalidation.invalidate_namespace(Namespace::Search.as_str())
    }
}
