//! SQLite-backed cache for search results.
//!
//! This module provides a persistent query cache using SQLite with async
//! access via tokio-rusqlite. It supports:
//!
//! - One entry per normalized query, enforced by the primary key
//! - Fixed time-to-live, filtered on read and swept in the background
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entry;
pub mod migrations;
pub mod search;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use entry::{CacheEntry, ResultItem};
pub use store::{CacheStore, InsertOutcome, NoopStore};
