//! Core types and shared functionality for smartsearch.
//!
//! This crate provides:
//! - Query cache store with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod query;

pub use cache::{CacheDb, CacheEntry, CacheStore, InsertOutcome, NoopStore, ResultItem};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
