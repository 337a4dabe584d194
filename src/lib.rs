//! Storefront Cache - durable content cache for a storefront
//!
//! Key-addressed, TTL-expiring store with memoized queries, namespace-aware
//! keys and mutation-driven invalidation.

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, EntityKind, InvalidationPolicy, MemoizedQuery};
pub use config::{Config, TtlPolicy};
pub use domain::ContentCache;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
