//! Remote annotation store client.
//!
//! CRUD against a keyed per-resource endpoint:
//!
//! - `GET  {base}/{segment}/{key}` -> `{ <field>: payload | null }`
//! - `POST {base}/{segment}/{key}` with `{ <field>, url, timestamp }` -> `{ status: "saved", .. }`
//! - `DELETE {base}/{segment}/{key}` -> confirmation body
//!
//! Load failures of any kind degrade to an explicit non-error outcome so a
//! session can always open with a default artifact; save and delete surface
//! typed errors the caller must handle. The client performs no retries and
//! keeps no state between calls.

pub mod error;

pub use error::StoreError;

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;
use urlmark_core::{AppConfig, ArtifactKind};

/// Default base URL of the annotation store API.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3001/api";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "urlmark/0.1";

/// Remote store client configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// API base, e.g. `http://127.0.0.1:3001/api`.
    pub base_url: Url,
    /// Request timeout (default: 10s). Timeout expiry is a failure outcome;
    /// the client imposes no timeout of its own beyond this.
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL parses"),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl StoreConfig {
    /// Build a store configuration from the application config.
    pub fn from_app(config: &AppConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.store_base_url).map_err(|e| StoreError::InvalidEndpoint(e.to_string()))?;
        Ok(Self { base_url, timeout: config.timeout(), ..Default::default() })
    }
}

/// Outcome of a load.
///
/// Loads never fail from the caller's perspective: transport, protocol, and
/// serialization problems all collapse into [`Loaded::Unavailable`], which
/// callers treat like [`Loaded::Absent`] when populating an editor. The
/// variant keeps the degradation explicit instead of swallowing it.
#[derive(Debug)]
pub enum Loaded {
    /// A stored payload exists for the key.
    Found(Value),
    /// The store answered and reports no record.
    Absent,
    /// The store could not answer; treated as absent, logged for diagnostics.
    Unavailable(StoreError),
}

impl Loaded {
    /// The payload, if one was found.
    pub fn into_payload(self) -> Option<Value> {
        match self {
            Loaded::Found(value) => Some(value),
            Loaded::Absent | Loaded::Unavailable(_) => None,
        }
    }

    /// True when no payload is available, for whatever reason.
    pub fn is_absent(&self) -> bool {
        !matches!(self, Loaded::Found(_))
    }
}

/// Confirmation of a persisted save.
#[derive(Debug, Clone)]
pub struct SaveReceipt {
    /// Key the record was written under.
    pub key: String,
    /// Server-side timestamp echo, when provided.
    pub timestamp: Option<i64>,
}

/// Confirmation of a removal.
#[derive(Debug, Clone)]
pub struct DeleteReceipt {
    /// Key the record was removed under.
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
}

/// HTTP client for the per-resource annotation store.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    http: reqwest::Client,
    config: StoreConfig,
}

impl RemoteStore {
    /// Create a new store client with the given configuration.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::InvalidEndpoint(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn endpoint(&self, kind: ArtifactKind, key: &str) -> Result<Url, StoreError> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{}/{key}", kind.segment())).map_err(|e| StoreError::InvalidEndpoint(e.to_string()))
    }

    /// Load the stored payload for a key.
    ///
    /// Never returns an error: any failure degrades to
    /// [`Loaded::Unavailable`] and is logged, so the caller can always open
    /// with a default artifact.
    pub async fn load(&self, kind: ArtifactKind, key: &str) -> Loaded {
        let url = match self.endpoint(kind, key) {
            Ok(url) => url,
            Err(e) => return Self::degrade(kind, key, e),
        };

        let response = match self
            .http
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Self::degrade(kind, key, e.into()),
        };

        let status = response.status();
        if !status.is_success() {
            return Self::degrade(kind, key, StoreError::Http { status: status.as_u16() });
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => return Self::degrade(kind, key, StoreError::Serialization(e.to_string())),
        };

        match classify_payload(kind, &body) {
            Ok(loaded) => loaded,
            Err(e) => Self::degrade(kind, key, e),
        }
    }

    fn degrade(kind: ArtifactKind, key: &str, error: StoreError) -> Loaded {
        tracing::warn!(kind = kind.segment(), key, %error, "load degraded to absent");
        Loaded::Unavailable(error)
    }

    /// Persist a payload under a key, overwriting any previous record.
    ///
    /// Succeeds only when the store's response marks the record as
    /// persisted; every other outcome is a typed error.
    pub async fn save(
        &self, kind: ArtifactKind, key: &str, payload: &Value, source_url: &str, timestamp: i64,
    ) -> Result<SaveReceipt, StoreError> {
        let url = self.endpoint(kind, key)?;

        let mut body = serde_json::Map::new();
        body.insert(kind.field().to_string(), payload.clone());
        body.insert("url".to_string(), Value::String(source_url.to_string()));
        body.insert("timestamp".to_string(), Value::from(timestamp));

        let response = self.http.post(url).json(&Value::Object(body)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Http { status: status.as_u16() });
        }

        let body: StatusBody = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        match body.status.as_deref() {
            Some("saved") => {
                tracing::debug!(kind = kind.segment(), key, "record persisted");
                Ok(SaveReceipt { key: key.to_string(), timestamp: body.timestamp })
            }
            other => Err(StoreError::Protocol(format!("unexpected save status: {other:?}"))),
        }
    }

    /// Remove the record for a key.
    ///
    /// Failure conditions mirror [`RemoteStore::save`]. Removing a key with
    /// no record is not an error.
    pub async fn delete(&self, kind: ArtifactKind, key: &str) -> Result<DeleteReceipt, StoreError> {
        let url = self.endpoint(kind, key)?;

        let response = self.http.delete(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Http { status: status.as_u16() });
        }

        let body: StatusBody = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        tracing::debug!(kind = kind.segment(), key, "record removed");
        Ok(DeleteReceipt { key: body.id.unwrap_or_else(|| key.to_string()) })
    }
}

/// Map a load response body onto a [`Loaded`] outcome.
///
/// A null field means the store has no record. For note-shaped artifacts an
/// empty string is equivalent to no record (the store answers `""` for
/// missing notes). A body without the expected field is a protocol error.
fn classify_payload(kind: ArtifactKind, body: &Value) -> Result<Loaded, StoreError> {
    match body.get(kind.field()) {
        None => Err(StoreError::Protocol(format!("response missing `{}` field", kind.field()))),
        Some(Value::Null) => Ok(Loaded::Absent),
        Some(Value::String(s)) if s.is_empty() => Ok(Loaded::Absent),
        Some(payload) => Ok(Loaded::Found(payload.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_building() {
        let store = RemoteStore::new(StoreConfig::default()).unwrap();
        let url = store.endpoint(ArtifactKind::Note, "boy1of").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3001/api/notes/boy1of");

        let url = store.endpoint(ArtifactKind::Drawing, "k1").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3001/api/drawings/k1");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let config = StoreConfig {
            base_url: Url::parse("http://127.0.0.1:3001/api/").unwrap(),
            ..Default::default()
        };
        let store = RemoteStore::new(config).unwrap();
        let url = store.endpoint(ArtifactKind::Note, "k1").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3001/api/notes/k1");
    }

    #[test]
    fn test_classify_found() {
        let body = json!({"note": "hello"});
        let loaded = classify_payload(ArtifactKind::Note, &body).unwrap();
        assert_eq!(loaded.into_payload(), Some(json!("hello")));
    }

    #[test]
    fn test_classify_null_is_absent() {
        let body = json!({"drawing": null});
        let loaded = classify_payload(ArtifactKind::Drawing, &body).unwrap();
        assert!(loaded.is_absent());
    }

    #[test]
    fn test_classify_empty_note_is_absent() {
        let body = json!({"note": ""});
        let loaded = classify_payload(ArtifactKind::Note, &body).unwrap();
        assert!(loaded.is_absent());
    }

    #[test]
    fn test_classify_missing_field_is_protocol_error() {
        let body = json!({"unexpected": 1});
        let result = classify_payload(ArtifactKind::Note, &body);
        assert!(matches!(result, Err(StoreError::Protocol(_))));
    }

    #[test]
    fn test_classify_structured_payload() {
        let body = json!({"drawing": {"elements": [], "appState": {}}});
        let loaded = classify_payload(ArtifactKind::Drawing, &body).unwrap();
        assert_eq!(loaded.into_payload(), Some(json!({"elements": [], "appState": {}})));
    }

    #[tokio::test]
    async fn test_load_unreachable_degrades_to_absent() {
        let config = StoreConfig {
            base_url: Url::parse("http://127.0.0.1:1/api").unwrap(),
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        let store = RemoteStore::new(config).unwrap();

        let loaded = store.load(ArtifactKind::Note, "k1").await;
        assert!(matches!(loaded, Loaded::Unavailable(_)));
        assert!(loaded.is_absent());
    }

    #[tokio::test]
    async fn test_save_unreachable_is_an_error() {
        let config = StoreConfig {
            base_url: Url::parse("http://127.0.0.1:1/api").unwrap(),
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        let store = RemoteStore::new(config).unwrap();

        let result = store
            .save(ArtifactKind::Note, "k1", &json!("hello"), "https://x/", 1000)
            .await;
        assert!(result.is_err());
    }
}
