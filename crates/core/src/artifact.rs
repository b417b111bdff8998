//! Artifact kinds and the record shape owned by the remote store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kinds of per-URL artifacts.
///
/// `Note` and `Drawing` are durable: they live in the remote store and go
/// through the autosave scheduler. `Summary` is derived: expensive to
/// recompute, so it lives in the bounded local cache instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Note,
    Drawing,
    Summary,
}

impl ArtifactKind {
    /// Path segment under the store's API base.
    pub fn segment(self) -> &'static str {
        match self {
            ArtifactKind::Note => "notes",
            ArtifactKind::Drawing => "drawings",
            ArtifactKind::Summary => "summaries",
        }
    }

    /// Name of the field carrying the payload in wire bodies.
    pub fn field(self) -> &'static str {
        match self {
            ArtifactKind::Note => "note",
            ArtifactKind::Drawing => "drawing",
            ArtifactKind::Summary => "summary",
        }
    }

    /// Whether the artifact persists in the remote store.
    pub fn is_durable(self) -> bool {
        !matches!(self, ArtifactKind::Summary)
    }

    /// Payload an editor surface shows when no record exists.
    pub fn empty_payload(self) -> Value {
        match self {
            ArtifactKind::Note | ArtifactKind::Summary => Value::String(String::new()),
            ArtifactKind::Drawing => Value::Null,
        }
    }
}

/// A stored annotation, as the remote store owns it.
///
/// Created on first save for a key, overwritten in place on every
/// subsequent save, removed on explicit delete. No history is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Fingerprint of the source URL.
    pub key: String,
    /// The URL the artifact is attached to.
    pub source_url: String,
    /// Opaque artifact payload (note text, drawing scene, summary text).
    pub payload: Value,
    /// Client timestamp of the last save, epoch milliseconds.
    pub saved_at: i64,
}
