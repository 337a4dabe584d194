//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache records.
//!
//! Lazy deletion on read only reclaims keys that are requested again, so
//! this sweep is what bounds disk usage.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::InvalidationPolicy;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. The directory scan runs on the blocking pool.
///
/// # Arguments
/// * `policy` - Invalidation policy bound to the shared store
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(CacheStore::open("./storage/cache")?);
/// let cleanup_handle = spawn_cleanup_task(InvalidationPolicy::new(store), 300);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(policy: InvalidationPolicy, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let sweeper = policy.clone();
            match tokio::task::spawn_blocking(move || sweeper.sweep()).await {
                Ok(0) => debug!("TTL sweep: no expired entries found"),
                Ok(removed) => info!("TTL sweep: removed {} expired entries", removed),
                Err(err) => warn!(error = %err, "TTL sweep task failed"),
            }
        }
    })
}
