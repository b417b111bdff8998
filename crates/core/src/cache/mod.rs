//! SQLite-backed bounded cache for derived artifacts.
//!
//! This module provides a persistent key/value store with async access via
//! tokio-rusqlite. It supports:
//!
//! - Namespaced keys inside a shared `kv` table
//! - A hard entry capacity enforced on every write (oldest-first eviction)
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use store::{BoundedCache, CacheEnvelope};
