//! Query resolution: cache lookup, coalesced upstream fetch, persistence.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use smartsearch_client::{MAX_RESULTS, ProviderError, ProviderItem, SearchProvider};
use smartsearch_core::query::NormalizedQuery;
use smartsearch_core::{CacheStore, Error, InsertOutcome, ResultItem};

use crate::inflight::{FetchResult, InFlight, Slot};

/// A resolved search, in the shape returned by `/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolved {
    pub from_cache: bool,
    pub results: Vec<ResultItem>,
}

/// Resolves queries against the cache, falling back to the provider.
///
/// Holds no per-request state. Cache faults are logged and absorbed; only
/// validation and provider faults reach the caller.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn CacheStore>,
    provider: Arc<dyn SearchProvider>,
    inflight: InFlight,
    timeout: Duration,
}

impl Resolver {
    pub fn new(store: Arc<dyn CacheStore>, provider: Arc<dyn SearchProvider>, timeout: Duration) -> Self {
        Self { store, provider, inflight: InFlight::new(), timeout }
    }

    /// Keys with an upstream fetch currently running.
    pub fn inflight(&self) -> &InFlight {
        &self.inflight
    }

    /// Resolve a raw user query.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidQuery` if the query is blank
    /// - `Error::ProviderMisconfigured` if credentials are absent and the query misses
    /// - `Error::ProviderUnavailable` if the upstream fetch fails or times out
    /// - `Error::Internal` if the shared fetch task died without a result
    pub async fn resolve(&self, raw_query: &str) -> Result<Resolved, Error> {
        let query = NormalizedQuery::parse(raw_query)?;

        match self.store.lookup(&query.key).await {
            Ok(Some(entry)) if !entry.results.is_empty() => {
                tracing::debug!(key = %query.key, results = entry.results.len(), "cache hit");
                return Ok(Resolved { from_cache: true, results: entry.results });
            }
            Ok(_) => tracing::debug!(key = %query.key, "cache miss"),
            Err(e) => tracing::warn!(key = %query.key, error = %e, "cache lookup failed; treating as miss"),
        }

        let results = self.fetch_coalesced(query).await??;
        Ok(Resolved { from_cache: false, results })
    }

    async fn fetch_coalesced(&self, query: NormalizedQuery) -> Result<FetchResult, Error> {
        let lease = match self.inflight.claim(&query.key) {
            Slot::Follower(rx) => {
                tracing::debug!(key = %query.key, "joining in-flight fetch");
                return InFlight::wait(rx).await;
            }
            Slot::Leader(lease) => lease,
        };

        let rx = lease.subscribe();
        let store = Arc::clone(&self.store);
        let provider = Arc::clone(&self.provider);
        let timeout = self.timeout;

        // Spawned so a disconnecting client cannot cancel the fetch for other waiters.
        tokio::spawn(async move {
            let result = fetch(provider.as_ref(), &query.raw, timeout).await;
            match &result {
                Ok(results) => persist(store.as_ref(), lease.key(), results).await,
                Err(e) => tracing::warn!(key = %lease.key(), error = %e, "upstream search failed"),
            }
            lease.publish(result);
        });

        InFlight::wait(rx).await
    }
}

async fn fetch(provider: &dyn SearchProvider, query: &str, timeout: Duration) -> FetchResult {
    let items = tokio::time::timeout(timeout, provider.search(query, MAX_RESULTS))
        .await
        .map_err(|_| ProviderError::Timeout)??;

    Ok(items.into_iter().map(normalize_item).collect())
}

/// Store `results` unless empty. Never fails the request.
async fn persist(store: &dyn CacheStore, key: &str, results: &[ResultItem]) {
    if results.is_empty() {
        tracing::debug!(key, "no results; not caching");
        return;
    }

    match store.insert(key, results).await {
        InsertOutcome::Created => tracing::debug!(key, results = results.len(), "cached search results"),
        InsertOutcome::Conflict => tracing::debug!(key, "cache entry already exists; keeping it"),
        InsertOutcome::Failure(e) => tracing::warn!(key, error = %e, "could not save cache (non-fatal)"),
    }
}

/// Map an upstream hit to a result item.
///
/// Missing fields become empty strings; a missing snippet falls back to the title.
pub fn normalize_item(item: ProviderItem) -> ResultItem {
    let title = item.title.unwrap_or_default();
    let snippet = item.snippet.filter(|s| !s.is_empty()).unwrap_or_else(|| title.clone());

    ResultItem { title, link: item.link.unwrap_or_default(), snippet }
}
