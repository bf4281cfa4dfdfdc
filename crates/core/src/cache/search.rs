//! Search cache operations.
//!
//! Provides functions for caching and retrieving normalized search results.
//! Every operation has an `_at` form taking the current time explicitly.

use super::connection::CacheDb;
use super::entry::{CacheEntry, ResultItem};
use super::store::InsertOutcome;
use crate::Error;
use chrono::{DateTime, Utc};
use tokio_rusqlite::params;

impl CacheDb {
    /// Get a valid cache entry for `key` as of `now`.
    ///
    /// Returns None if the key doesn't exist or the entry has expired.
    pub async fn lookup_at(&self, key: &str, now: DateTime<Utc>) -> Result<Option<CacheEntry>, Error> {
        let key = key.to_string();
        let threshold = self.expiry_threshold(now);
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt =
                    conn.prepare("SELECT results_json, created_at FROM search_cache WHERE query = ?1 AND created_at > ?2")?;

                let row = stmt.query_row(params![key, threshold], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                });

                let (results_json, created_ms) = match row {
                    Ok(row) => row,
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let results: Vec<ResultItem> = serde_json::from_str(&results_json)?;
                let created_at = DateTime::from_timestamp_millis(created_ms)
                    .ok_or_else(|| Error::Serialization(format!("invalid created_at: {created_ms}")))?;

                Ok(Some(CacheEntry { key, results, created_at }))
            })
            .await
            .map_err(Error::from)
    }

    /// Create an entry for `key` stamped with `now`.
    ///
    /// An existing row for the key, expired or not, is left untouched and
    /// reported as `Conflict`.
    pub async fn insert_at(&self, key: &str, results: &[ResultItem], now: DateTime<Utc>) -> InsertOutcome {
        match self.try_insert(key, results, now).await {
            Ok(true) => InsertOutcome::Created,
            Ok(false) => InsertOutcome::Conflict,
            Err(e) => InsertOutcome::Failure(e),
        }
    }

    async fn try_insert(&self, key: &str, results: &[ResultItem], now: DateTime<Utc>) -> Result<bool, Error> {
        let key = key.to_string();
        let results_json = serde_json::to_string(results)?;
        let created_at = now.timestamp_millis();

        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let inserted = conn.execute(
                    "INSERT INTO search_cache (query, results_json, created_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(query) DO NOTHING",
                    params![key, results_json, created_at],
                )?;
                Ok(inserted == 1)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete entries that have expired as of `now`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let threshold = self.expiry_threshold(now);
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM search_cache WHERE created_at <= ?1", params![threshold])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete expired entries as of the current time.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        self.purge_expired_at(Utc::now()).await
    }

    /// Rows created at or before this millisecond timestamp are expired.
    ///
    /// A TTL reaching past the earliest representable time expires nothing.
    fn expiry_threshold(&self, now: DateTime<Utc>) -> i64 {
        now.checked_sub_signed(self.ttl).map_or(i64::MIN, |t| t.timestamp_millis())
    }

    /// Number of rows physically stored, expired or not.
    pub async fn entry_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM search_cache", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
