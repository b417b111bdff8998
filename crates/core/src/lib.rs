//! Core types and shared functionality for urlmark.
//!
//! This crate provides:
//! - Deterministic per-URL fingerprinting
//! - Artifact kinds and the stored record shape
//! - Bounded local cache for derived artifacts (SQLite backend)
//! - Layered configuration
//! - Unified error types

pub mod artifact;
pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;

pub use artifact::{AnnotationRecord, ArtifactKind};
pub use cache::{BoundedCache, CacheDb};
pub use config::AppConfig;
pub use error::Error;
pub use fingerprint::fingerprint;
