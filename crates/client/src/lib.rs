//! Client side of urlmark.
//!
//! This crate provides the remote annotation store client, the autosave
//! scheduler, and the session lifecycle controller that ties them to an
//! editor surface.

pub mod autosave;
pub mod session;
pub mod store;

pub use autosave::{Autosave, SaveSink};
pub use session::{DerivedSession, EditorSurface, Session};
pub use store::{DeleteReceipt, Loaded, RemoteStore, SaveReceipt, StoreConfig, StoreError};
