//! Google Custom Search request types and validation.

use serde::Serialize;

use crate::ProviderError;

/// Largest page Google Custom Search will return.
pub const MAX_RESULTS: u8 = 10;

/// Longest query accepted before hitting the network.
const MAX_QUERY_CHARS: usize = 2048;

/// Search request parameters for the Custom Search JSON API.
///
/// Credentials are attached by the client, not stored here.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    /// Search query as typed by the user.
    pub q: String,

    /// Number of results (1-10).
    pub num: u8,
}

impl SearchRequest {
    pub fn new(q: impl Into<String>, num: u8) -> Self {
        Self { q: q.into(), num }
    }

    /// Validate the search request parameters.
    ///
    /// Returns an error if any parameters are out of range or malformed.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.q.trim().is_empty() {
            return Err(ProviderError::InvalidRequest("query cannot be empty".to_string()));
        }

        let chars = self.q.chars().count();
        if chars > MAX_QUERY_CHARS {
            return Err(ProviderError::InvalidRequest(format!(
                "query too long: {chars} chars (max {MAX_QUERY_CHARS})"
            )));
        }

        if !(1..=MAX_RESULTS).contains(&self.num) {
            return Err(ProviderError::InvalidRequest(format!("num must be 1-{MAX_RESULTS}")));
        }

        Ok(())
    }
}
