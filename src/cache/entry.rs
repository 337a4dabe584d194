//! Cache Entry Module
//!
//! Defines the persisted record for a single cached value with TTL metadata.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::cache::key::namespace_of;

// == Cache Entry ==
/// A single persisted cache record.
///
/// The TTL lives inside the record itself, so a record is self-describing:
/// reading it back is enough to decide whether it is still valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// Logical cache key
    pub key: String,
    /// Namespace tag, used for bulk deletion
    pub namespace: String,
    /// The memoized value
    pub data: T,
    /// Creation timestamp (Unix seconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix seconds); dead once `now > expires_at`
    pub expires_at: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_seconds` from now.
    pub fn new(key: impl Into<String>, data: T, ttl_seconds: u64) -> Self {
        let key = key.into();
        let now = current_timestamp();

        Self {
            namespace: namespace_of(&key).to_string(),
            key,
            data,
            created_at: now,
            expires_at: now.saturating_add(ttl_seconds),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp())
    }

    /// Checks expiry against an explicit timestamp.
    ///
    /// An entry is still valid during the second named by `expires_at`
    /// and becomes dead strictly after it.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in seconds, 0 once expired.
    pub fn ttl_remaining(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
