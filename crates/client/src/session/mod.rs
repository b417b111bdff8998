//! Session lifecycle: open -> load -> edit -> (auto)save -> close.
//!
//! A session is the explicit object that owns everything the old
//! userscript-style globals held: the resource key, the store handle, the
//! scheduler, and the editor surface. Two sessions never share debounce
//! state, so a flush in one cannot cancel a deadline in another.

use crate::autosave::{Autosave, SaveSink};
use crate::store::{DeleteReceipt, Loaded, RemoteStore, SaveReceipt, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use urlmark_core::{ArtifactKind, BoundedCache, Error as CacheError, fingerprint};

/// The collaborator-facing hooks into a third-party editor integration.
///
/// These are the only calls the core makes into editor or drawing-library
/// wiring; everything else about the UI is out of scope.
pub trait EditorSurface: Send {
    /// The artifact as the user currently sees it.
    fn current_payload(&self) -> Value;
    /// Replace the artifact shown to the user.
    fn set_payload(&mut self, payload: Value);
}

/// Bridges the scheduler to the remote store for one session's key.
struct StoreSink {
    store: RemoteStore,
    kind: ArtifactKind,
    key: String,
    source_url: String,
}

#[async_trait]
impl SaveSink for StoreSink {
    async fn save(&self, payload: Value) -> Result<(), StoreError> {
        self.store
            .save(
                self.kind,
                &self.key,
                &payload,
                &self.source_url,
                chrono::Utc::now().timestamp_millis(),
            )
            .await
            .map(|_| ())
    }
}

/// An editing session for a durable artifact (note or drawing).
pub struct Session<S: EditorSurface> {
    kind: ArtifactKind,
    key: String,
    source_url: String,
    store: RemoteStore,
    autosave: Autosave,
    surface: S,
}

impl<S: EditorSurface> Session<S> {
    /// Open a session for the given URL.
    ///
    /// Computes the fingerprint, loads the stored payload, and populates
    /// the surface. A failed or empty load leaves the surface on its
    /// default content; opening never fails.
    pub async fn open(store: RemoteStore, kind: ArtifactKind, source_url: &str, surface: S, quiet_period: Duration) -> Self {
        debug_assert!(kind.is_durable(), "derived artifacts use DerivedSession");

        let key = fingerprint(source_url);
        let mut surface = surface;

        match store.load(kind, &key).await {
            Loaded::Found(payload) => surface.set_payload(payload),
            // Unavailable is already logged by the store client.
            Loaded::Absent | Loaded::Unavailable(_) => {}
        }

        let sink = Arc::new(StoreSink {
            store: store.clone(),
            kind,
            key: key.clone(),
            source_url: source_url.to_string(),
        });
        let autosave = Autosave::with_quiet_period(sink, quiet_period);

        Self { kind, key, source_url: source_url.to_string(), store, autosave, surface }
    }

    /// The resource key this session writes under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrow the editor surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Borrow the editor surface mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Forward the surface's current payload into the scheduler.
    ///
    /// Call on every edit notification from the editor; the scheduler
    /// coalesces bursts into one deferred save.
    pub fn notify_edited(&self) {
        self.autosave.record_edit(self.surface.current_payload());
    }

    /// Save immediately, bypassing the debounce.
    ///
    /// For explicit user action; the result is surfaced so the UI can show
    /// success or failure. A concurrently firing debounce save is not
    /// prevented; the store's overwrite-by-key semantics make the last
    /// completed write win.
    pub async fn save_now(&self) -> Result<SaveReceipt, StoreError> {
        self.store
            .save(
                self.kind,
                &self.key,
                &self.surface.current_payload(),
                &self.source_url,
                chrono::Utc::now().timestamp_millis(),
            )
            .await
    }

    /// Remove the stored record and blank the surface.
    pub async fn delete(&mut self) -> Result<DeleteReceipt, StoreError> {
        let receipt = self.store.delete(self.kind, &self.key).await?;
        self.surface.set_payload(self.kind.empty_payload());
        Ok(receipt)
    }

    /// Close the session: flush the current payload, then release the
    /// surface back to the caller.
    ///
    /// The flush is awaited but best-effort; a failure is logged and does
    /// not block teardown.
    pub async fn close(self) -> S {
        let payload = self.surface.current_payload();
        if let Err(error) = self.autosave.flush(Some(payload)).await {
            tracing::warn!(kind = self.kind.segment(), key = %self.key, %error, "flush on close failed");
        }
        self.surface
    }
}

/// Access to a derived, compute-once artifact (summary) for one URL.
///
/// Derived artifacts skip the remote store and the scheduler: reads and
/// writes go straight to the bounded local cache.
#[derive(Clone)]
pub struct DerivedSession {
    cache: BoundedCache,
    key: String,
    source_url: String,
}

impl DerivedSession {
    /// Open cache access for the given URL.
    pub fn open(cache: BoundedCache, source_url: &str) -> Self {
        Self { cache, key: fingerprint(source_url), source_url: source_url.to_string() }
    }

    /// The resource key this session reads and writes under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The cached artifact for this URL, if one was computed before.
    pub async fn lookup(&self) -> Result<Option<Value>, CacheError> {
        self.cache.get(&self.key).await
    }

    /// Cache a freshly computed artifact for this URL.
    pub async fn store(&self, value: &Value) -> Result<(), CacheError> {
        self.cache.put(&self.key, value, &self.source_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use serde_json::json;
    use url::Url;
    use urlmark_core::CacheDb;

    struct FakeEditor {
        payload: Value,
    }

    impl EditorSurface for FakeEditor {
        fn current_payload(&self) -> Value {
            self.payload.clone()
        }

        fn set_payload(&mut self, payload: Value) {
            self.payload = payload;
        }
    }

    fn unreachable_store() -> RemoteStore {
        let config = StoreConfig {
            base_url: Url::parse("http://127.0.0.1:1/api").unwrap(),
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        RemoteStore::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_open_with_unreachable_store_keeps_default_payload() {
        let surface = FakeEditor { payload: json!("") };
        let session = Session::open(
            unreachable_store(),
            ArtifactKind::Note,
            "https://a.example/",
            surface,
            Duration::from_secs(30),
        )
        .await;

        assert_eq!(session.key(), "boy1of");
        assert_eq!(session.surface().current_payload(), json!(""));
    }

    #[tokio::test]
    async fn test_close_completes_despite_failed_flush() {
        let surface = FakeEditor { payload: json!("unsaved text") };
        let session = Session::open(
            unreachable_store(),
            ArtifactKind::Note,
            "https://a.example/",
            surface,
            Duration::from_secs(30),
        )
        .await;

        // Flush fails against the unreachable store; close still returns.
        let surface = session.close().await;
        assert_eq!(surface.current_payload(), json!("unsaved text"));
    }

    #[tokio::test]
    async fn test_save_now_surfaces_failure() {
        let surface = FakeEditor { payload: json!("text") };
        let session = Session::open(
            unreachable_store(),
            ArtifactKind::Note,
            "https://a.example/",
            surface,
            Duration::from_secs(30),
        )
        .await;

        assert!(session.save_now().await.is_err());
    }

    #[tokio::test]
    async fn test_sessions_share_nothing() {
        let a = Session::open(
            unreachable_store(),
            ArtifactKind::Note,
            "https://a.example/",
            FakeEditor { payload: json!("a") },
            Duration::from_secs(30),
        )
        .await;
        let b = Session::open(
            unreachable_store(),
            ArtifactKind::Note,
            "https://b.example/",
            FakeEditor { payload: json!("b") },
            Duration::from_secs(30),
        )
        .await;

        assert_ne!(a.key(), b.key());
        // Closing one session must not disturb the other.
        a.close().await;
        assert_eq!(b.surface().current_payload(), json!("b"));
    }

    #[tokio::test]
    async fn test_derived_session_round_trip() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = BoundedCache::new(db, "summary:", 50);
        let session = DerivedSession::open(cache.clone(), "https://a.example/");

        assert!(session.lookup().await.unwrap().is_none());
        session.store(&json!("a summary")).await.unwrap();
        assert_eq!(session.lookup().await.unwrap(), Some(json!("a summary")));

        // A second open of the same URL sees the cached artifact.
        let again = DerivedSession::open(cache, "https://a.example/");
        assert_eq!(again.key(), session.key());
        assert_eq!(again.lookup().await.unwrap(), Some(json!("a summary")));
    }
}
