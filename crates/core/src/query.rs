//! Query validation and cache key normalization.

use crate::Error;

/// A validated search query.
///
/// `raw` is the trimmed query as the user typed it and is what goes upstream.
/// `key` is the cache identity: trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub raw: String,
    pub key: String,
}

impl NormalizedQuery {
    /// Validate and normalize a raw query string.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidQuery` if the query is empty after trimming.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidQuery("query cannot be empty".into()));
        }

        Ok(Self { raw: trimmed.to_string(), key: cache_key(trimmed) })
    }
}

/// Cache key for an already trimmed query.
pub fn cache_key(trimmed: &str) -> String {
    trimmed.to_lowercase()
}
