//! File-backed annotation store server.
//!
//! Serves the per-resource CRUD API the urlmark client speaks: notes persist
//! as Markdown files carrying their source URL in a comment, drawings as
//! JSON files. Absent records answer with an empty payload rather than an
//! HTTP error, so clients can always open with a default artifact.

pub mod error;
pub mod routes;
pub mod storage;

pub use error::ApiError;
pub use routes::router;
pub use storage::FileStore;
