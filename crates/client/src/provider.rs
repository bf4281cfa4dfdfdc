//! Upstream search provider contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use smartsearch_core::Error;

/// One raw upstream hit. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

/// Errors from an upstream search provider.
///
/// `Clone` so a single fetch outcome can be handed to every coalesced waiter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// API key or search engine id not configured.
    #[error("missing credentials: API_KEY/CX not set")]
    MissingCredentials,

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited or quota exhausted upstream.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ProviderError::Timeout } else { ProviderError::Network(Arc::new(err)) }
    }
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingCredentials => Error::ProviderMisconfigured(err.to_string()),
            _ => Error::ProviderUnavailable(err.to_string()),
        }
    }
}

/// A search backend returning hits in relevance order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for `query`, returning at most `count` items.
    async fn search(&self, query: &str, count: u8) -> Result<Vec<ProviderItem>, ProviderError>;
}

/// Provider installed when credentials are absent.
///
/// Every call fails with `MissingCredentials`; cached queries keep working.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredProvider;

#[async_trait]
impl SearchProvider for UnconfiguredProvider {
    async fn search(&self, _query: &str, _count: u8) -> Result<Vec<ProviderItem>, ProviderError> {
        Err(ProviderError::MissingCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::MissingCredentials;
        assert!(err.to_string().contains("API_KEY/CX"));

        let err = ProviderError::HttpError { status: 503 };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(Error::from(ProviderError::MissingCredentials), Error::ProviderMisconfigured(_)));
        assert!(matches!(Error::from(ProviderError::Timeout), Error::ProviderUnavailable(_)));
        assert!(matches!(Error::from(ProviderError::AuthError), Error::ProviderUnavailable(_)));
        assert!(matches!(Error::from(ProviderError::HttpError { status: 500 }), Error::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let provider = UnconfiguredProvider;
        let result = provider.search("golang", 10).await;
        assert!(matches!(result, Err(ProviderError::MissingCredentials)));
    }
}
