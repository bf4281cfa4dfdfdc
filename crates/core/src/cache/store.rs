//! The cache contract consumed by the resolver.

use async_trait::async_trait;
use chrono::Utc;

use super::connection::CacheDb;
use super::entry::{CacheEntry, ResultItem};
use crate::Error;

/// Result of an attempt to create a cache entry.
#[derive(Debug)]
pub enum InsertOutcome {
    /// A new entry was stored.
    Created,
    /// An entry for the key already exists and was left untouched.
    Conflict,
    /// The store could not be written.
    Failure(Error),
}

/// Key/value store of normalized query -> result set with a fixed TTL.
///
/// Implementations must tolerate concurrent calls on the same key and must
/// never return an expired entry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// The entry for `key` if it exists and is unexpired.
    async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, Error>;

    /// Create an entry for `key`. Never overwrites.
    async fn insert(&self, key: &str, results: &[ResultItem]) -> InsertOutcome;
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        self.lookup_at(key, Utc::now()).await
    }

    async fn insert(&self, key: &str, results: &[ResultItem]) -> InsertOutcome {
        self.insert_at(key, results, Utc::now()).await
    }
}

/// Store used when the datastore could not be opened.
///
/// Every lookup misses and every insert fails, so the resolver keeps working
/// without a cache.
#[derive(Debug, Clone, Default)]
pub struct NoopStore;

#[async_trait]
impl CacheStore for NoopStore {
    async fn lookup(&self, _key: &str) -> Result<Option<CacheEntry>, Error> {
        Ok(None)
    }

    async fn insert(&self, _key: &str, _results: &[ResultItem]) -> InsertOutcome {
        InsertOutcome::Failure(Error::CacheUnavailable("cache store disabled".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_noop_store_never_caches() {
        let store: Arc<dyn CacheStore> = Arc::new(NoopStore);
        let results = vec![ResultItem::new("t", "l", "s")];

        assert!(matches!(store.insert("k", &results).await, InsertOutcome::Failure(Error::CacheUnavailable(_))));
        assert!(store.lookup("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_db_as_trait_object() {
        let db = CacheDb::open_in_memory(chrono::Duration::days(7)).await.unwrap();
        let store: Arc<dyn CacheStore> = Arc::new(db);
        let results = vec![ResultItem::new("t", "l", "s")];

        assert!(matches!(store.insert("k", &results).await, InsertOutcome::Created));
        assert!(matches!(store.insert("k", &results).await, InsertOutcome::Conflict));
        assert_eq!(store.lookup("k").await.unwrap().unwrap().results, results);
    }
}
