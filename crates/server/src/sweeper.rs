//! Background eviction of expired cache entries.

use std::time::Duration;

use smartsearch_core::CacheDb;
use tokio::task::JoinHandle;

/// Spawn a task that purges expired entries every `interval`.
///
/// Lookups already ignore expired rows; this reclaims space and frees the
/// key so the next miss can store a fresh entry.
pub fn spawn(db: CacheDb, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match db.purge_expired().await {
                Ok(0) => tracing::trace!("no expired cache entries"),
                Ok(count) => tracing::info!(count, "purged expired cache entries"),
                Err(e) => tracing::warn!(error = %e, "cache sweep failed"),
            }
        }
    })
}
