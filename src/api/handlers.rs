//! API Handlers
//!
//! HTTP request handlers for the cache maintenance endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheStore, EntityKind, InvalidationReport};
use crate::config::Config;
use crate::domain::ContentCache;
use crate::error::{CacheError, Result};
use crate::models::{HealthResponse, InvalidateRequest, RemovedResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storefront cache façade over the shared store
    pub cache: ContentCache,
}

impl AppState {
    /// Creates a new AppState with the given cache façade.
    pub fn new(cache: ContentCache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the store at the configured directory, creating it if absent.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(CacheStore::open(&config.cache_dir)?);
        Ok(Self::new(ContentCache::new(store, config.ttl)))
    }
}

/// Runs store work on the blocking pool; every maintenance call scans the cache directory.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await?)
}

/// Handler for GET /stats
///
/// Returns storage introspection plus activity counters.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = blocking(move || state.cache.store().stats()).await?;
    Ok(Json(stats.into()))
}

/// Handler for POST /sweep
///
/// Removes expired and unreadable entries.
pub async fn sweep_handler(State(state): State<AppState>) -> Result<Json<RemovedResponse>> {
    let removed = blocking(move || state.cache.invalidation().sweep()).await?;
    Ok(Json(RemovedResponse::new("Sweep", removed)))
}

/// Handler for POST /invalidate
///
/// Deletes the cache entries that depend on a mutated entity.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidationReport>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let kind: EntityKind = req.entity_type.parse()?;
    let id = req.entity_id.to_string();
    let parent = req.parent_category_id.map(|p| p.to_string());

    let report = blocking(move || state.cache.invalidate(kind, &id, parent.as_deref())).await?;
    Ok(Json(report))
}

/// Handler for DELETE /namespace/:namespace
///
/// Drops every entry in one namespace.
pub async fn namespace_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<InvalidationReport>> {
    let report = blocking(move || state.cache.invalidation().invalidate_namespace(&namespace)).await?;
    Ok(Json(report))
}

/// Handler for DELETE /cache
///
/// Removes every entry.
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<RemovedResponse>> {
    let removed = blocking(move || state.cache.store().clear()).await?;
    Ok(Json(RemovedResponse::new("Clear", removed)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
