//! In-flight fetch coalescing.
//!
//! Concurrent misses for the same normalized key share one upstream fetch.
//! The first caller gets a [`Lease`] and does the work; later callers get a
//! receiver and wait for the lease holder to publish. The map entry lives
//! exactly as long as the lease, so a finished or failed fetch is never
//! served from here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use smartsearch_client::ProviderError;
use smartsearch_core::{Error, ResultItem};
use tokio::sync::watch;

/// Outcome of one upstream fetch, shared by every waiter.
pub type FetchResult = Result<Vec<ResultItem>, ProviderError>;

type Pending = HashMap<String, watch::Receiver<Option<FetchResult>>>;

/// Process-wide map of keys with a fetch in progress.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    pending: Arc<Mutex<Pending>>,
}

/// What a caller should do after claiming a key.
#[derive(Debug)]
pub enum Slot {
    /// No fetch was running; the holder must fetch and publish.
    Leader(Lease),
    /// A fetch is running; wait on the receiver.
    Follower(watch::Receiver<Option<FetchResult>>),
}

/// Exclusive right to fetch a key. Dropping it unregisters the key.
#[derive(Debug)]
pub struct Lease {
    key: String,
    tx: watch::Sender<Option<FetchResult>>,
    inflight: InFlight,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Become the fetcher for `key`, or join the fetch already running.
    pub fn claim(&self, key: &str) -> Slot {
        let mut pending = self.lock();
        if let Some(rx) = pending.get(key) {
            return Slot::Follower(rx.clone());
        }

        let (tx, rx) = watch::channel(None);
        pending.insert(key.to_string(), rx);
        Slot::Leader(Lease { key: key.to_string(), tx, inflight: self.clone() })
    }

    /// Number of keys currently being fetched.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait for the lease holder to publish.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if the lease was dropped without publishing.
    pub async fn wait(mut rx: watch::Receiver<Option<FetchResult>>) -> Result<FetchResult, Error> {
        let published = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| Error::Internal("in-flight fetch ended without a result".into()))?;

        published
            .clone()
            .ok_or_else(|| Error::Internal("in-flight fetch published nothing".into()))
    }
}

impl Lease {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Receiver for the holder's own result.
    pub fn subscribe(&self) -> watch::Receiver<Option<FetchResult>> {
        self.tx.subscribe()
    }

    /// Hand the outcome to every current waiter.
    pub fn publish(&self, result: FetchResult) {
        self.tx.send_replace(Some(result));
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.inflight.lock().remove(&self.key);
    }
}
