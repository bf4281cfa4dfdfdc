//! Cached search data model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single search hit, in the shape returned to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

impl ResultItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self { title: title.into(), link: link.into(), snippet: snippet.into() }
    }
}

/// A stored result set for one normalized query.
///
/// Results keep the upstream order. Entries are never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub results: Vec<ResultItem>,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry may still be served at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at < ttl
    }
}
