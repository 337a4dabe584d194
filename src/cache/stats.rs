//! Cache Statistics Module
//!
//! Storage introspection plus in-process hit/miss/write counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of the store's contents and activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Records currently on disk
    pub total_entries: usize,
    /// Records that are parseable and not expired
    pub valid_entries: usize,
    /// Records that are expired or unreadable, awaiting a sweep
    pub expired_entries: usize,
    /// Bytes occupied by all records
    pub total_bytes: u64,
    /// Root directory of the store
    pub location: String,
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that found nothing usable
    pub misses: u64,
    /// Successful writes
    pub writes: u64,
    /// Writes that could not be persisted
    pub write_failures: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Counters ==
/// Lock-free activity counters shared by all users of a store.
#[derive(Debug, Default)]
pub struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    write_failures: AtomicU64,
}

impl StatsCounters {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counters into a stats snapshot.
    pub fn fill(&self, stats: &mut CacheStats) {
        stats.hits = self.hits.load(Ordering::Relaxed);
        stats.misses = self.misses.load(Ordering::Relaxed);
        stats.writes = self.writes.load(Ordering::Relaxed);
        stats.write_failures = self.write_failures.load(Ordering::Relaxed);
    }
}
