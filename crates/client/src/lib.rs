//! Client code for smartsearch.
//!
//! This crate provides the upstream search provider seam and the Google
//! Custom Search implementation used by the server.

pub mod google;
pub mod provider;

pub use google::{GoogleClient, GoogleConfig, MAX_RESULTS, SearchRequest};
pub use provider::{ProviderError, ProviderItem, SearchProvider, UnconfiguredProvider};
