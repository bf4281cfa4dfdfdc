//! Google Custom Search JSON API client.
//!
//! ### Specification
//!
//! - **Endpoint**: `https://www.googleapis.com/customsearch/v1`
//! - **Authentication**: `key` (API key) and `cx` (search engine id) query parameters.
//! - **Paging**: a single page of at most 10 results.
//! - **Errors**: 401/403 are auth failures, 429 is quota/rate limiting,
//!   any other 4xx/5xx is an HTTP error. Nothing is retried here.

pub mod request;
pub mod response;

pub use request::{MAX_RESULTS, SearchRequest};
pub use response::GoogleApiResponse;

use async_trait::async_trait;
use reqwest::header;
use smartsearch_core::AppConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{ProviderError, ProviderItem, SearchProvider};

/// Default base URL for the Custom Search API.
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "smartsearch/0.1";

/// Google client configuration.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// API key (API_KEY).
    pub api_key: String,
    /// Search engine id (CX).
    pub cx: String,
    /// Endpoint URL (default: https://www.googleapis.com/customsearch/v1).
    pub base_url: String,
    /// Request timeout (default: 8s).
    pub timeout: Duration,
    /// User-agent string (default: smartsearch/0.x).
    pub user_agent: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            cx: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GoogleConfig {
    /// Build from application configuration.
    ///
    /// Returns `MissingCredentials` if either API key or engine id is absent.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let (api_key, cx) = config
            .require_provider_credentials()
            .map_err(|_| ProviderError::MissingCredentials)?;

        Ok(Self {
            api_key: api_key.to_string(),
            cx: cx.to_string(),
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Google Custom Search client.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    config: Arc<GoogleConfig>,
}

impl GoogleClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GoogleConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() || config.cx.trim().is_empty() {
            return Err(ProviderError::MissingCredentials);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Network(Arc::new(e)))?;

        Ok(Self { http, config: Arc::new(config) })
    }

    /// Create a new client from application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(GoogleConfig::from_app_config(config)?)
    }

    /// Execute a search query.
    pub async fn execute(&self, req: SearchRequest) -> Result<Vec<ProviderItem>, ProviderError> {
        req.validate()?;

        let start = Instant::now();
        tracing::debug!(query = %req.q, num = req.num, "searching Google CSE");

        let http_response = self
            .http
            .get(&self.config.base_url)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(&req)
            .query(&[("key", self.config.api_key.as_str()), ("cx", self.config.cx.as_str())])
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!(%status, "Google CSE response status");

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthError);
        }

        if status == 429 {
            return Err(ProviderError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(ProviderError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let api_response: GoogleApiResponse =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;
        let items = api_response.into_items();

        tracing::debug!(elapsed = ?start.elapsed(), results = items.len(), "search completed");

        Ok(items)
    }
}

#[async_trait]
impl SearchProvider for GoogleClient {
    async fn search(&self, query: &str, count: u8) -> Result<Vec<ProviderItem>, ProviderError> {
        self.execute(SearchRequest::new(query, count)).await
    }
}
