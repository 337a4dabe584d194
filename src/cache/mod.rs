//! Cache Module
//!
//! Durable TTL cache storage, key derivation, memoized queries and
//! invalidation.

mod entry;
pub mod invalidation;
pub mod key;
mod memo;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp, CacheEntry};
pub use invalidation::{EntityKind, InvalidationPolicy, InvalidationReport};
pub use key::{Identity, Namespace};
pub use memo::MemoizedQuery;
pub use stats::{CacheStats, StatsCounters};
pub use store::CacheStore;
