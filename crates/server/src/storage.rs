//! Filesystem persistence for annotation records.
//!
//! One file per record, named by the resource key: notes are Markdown with
//! the source URL in a leading HTML comment, drawings are pretty-printed
//! JSON. Missing files read as absent, never as errors.

use crate::error::ApiError;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use urlmark_core::AppConfig;

/// File-backed record store for both durable artifact kinds.
#[derive(Debug, Clone)]
pub struct FileStore {
    notes_dir: PathBuf,
    drawings_dir: PathBuf,
}

impl FileStore {
    pub fn new(notes_dir: impl Into<PathBuf>, drawings_dir: impl Into<PathBuf>) -> Self {
        Self { notes_dir: notes_dir.into(), drawings_dir: drawings_dir.into() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.notes_dir, &config.drawings_dir)
    }

    /// Storage root for notes.
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Storage root for drawings.
    pub fn drawings_dir(&self) -> &Path {
        &self.drawings_dir
    }

    /// Create both storage roots if they don't exist yet.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.notes_dir).await?;
        tokio::fs::create_dir_all(&self.drawings_dir).await?;
        Ok(())
    }

    fn note_path(&self, key: &str) -> Result<PathBuf, ApiError> {
        validate_key(key)?;
        Ok(self.notes_dir.join(format!("{key}.md")))
    }

    fn drawing_path(&self, key: &str) -> Result<PathBuf, ApiError> {
        validate_key(key)?;
        Ok(self.drawings_dir.join(format!("{key}.json")))
    }

    /// Read a note, stripping the URL comment. Missing file reads as None.
    pub async fn read_note(&self, key: &str) -> Result<Option<String>, ApiError> {
        let path = self.note_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(extract_note_content(&raw).to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a note with its source URL as a leading Markdown comment.
    pub async fn write_note(&self, key: &str, note: &str, source_url: &str) -> Result<(), ApiError> {
        let path = self.note_path(key)?;
        tokio::fs::create_dir_all(&self.notes_dir).await?;
        tokio::fs::write(&path, format_note_with_url(note, source_url)).await?;
        Ok(())
    }

    /// Remove a note. Removing a missing note succeeds.
    pub async fn delete_note(&self, key: &str) -> Result<(), ApiError> {
        remove_if_exists(self.note_path(key)?).await
    }

    /// Read a drawing scene. Missing file reads as None.
    pub async fn read_drawing(&self, key: &str) -> Result<Option<Value>, ApiError> {
        let path = self.drawing_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let scene = serde_json::from_str(&raw).map_err(|e| ApiError::Corrupt(e.to_string()))?;
                Ok(Some(scene))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a drawing scene as pretty-printed JSON.
    pub async fn write_drawing(&self, key: &str, scene: &Value) -> Result<(), ApiError> {
        let path = self.drawing_path(key)?;
        let raw = serde_json::to_string_pretty(scene).map_err(|e| ApiError::Corrupt(e.to_string()))?;
        tokio::fs::create_dir_all(&self.drawings_dir).await?;
        tokio::fs::write(&path, raw).await?;
        Ok(())
    }

    /// Remove a drawing. Removing a missing drawing succeeds.
    pub async fn delete_drawing(&self, key: &str) -> Result<(), ApiError> {
        remove_if_exists(self.drawing_path(key)?).await
    }
}

async fn remove_if_exists(path: PathBuf) -> Result<(), ApiError> {
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Keys are fingerprints: lowercase base-36. Anything else is rejected
/// before it can reach the filesystem as a path component.
fn validate_key(key: &str) -> Result<(), ApiError> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err(ApiError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn format_note_with_url(note: &str, source_url: &str) -> String {
    format!("<!-- URL: {source_url} -->\n{note}")
}

/// Strip the URL comment line, if present, from stored note content.
fn extract_note_content(raw: &str) -> &str {
    if let Some(first_line) = raw.lines().next()
        && first_line.starts_with("<!-- URL: ")
        && first_line.ends_with(" -->")
    {
        let rest = &raw[first_line.len()..];
        return rest.trim_start_matches('\n');
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> (FileStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("notes"), dir.path().join("drawings"));
        (store, dir)
    }

    #[test]
    fn test_note_formatting_round_trip() {
        let formatted = format_note_with_url("# Heading\n\nbody", "https://a.example/");
        assert!(formatted.starts_with("<!-- URL: https://a.example/ -->\n"));
        assert_eq!(extract_note_content(&formatted), "# Heading\n\nbody");
    }

    #[test]
    fn test_extract_without_comment_is_identity() {
        assert_eq!(extract_note_content("plain note"), "plain note");
    }

    #[test]
    fn test_key_validation() {
        assert!(validate_key("boy1of").is_ok());
        assert!(validate_key("0").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key("UPPER").is_err());
        assert!(validate_key("has space").is_err());
    }

    #[tokio::test]
    async fn test_note_write_read_delete() {
        let (store, _dir) = store();
        assert!(store.read_note("k1").await.unwrap().is_none());

        store.write_note("k1", "hello", "https://a.example/").await.unwrap();
        assert_eq!(store.read_note("k1").await.unwrap().unwrap(), "hello");

        store.delete_note("k1").await.unwrap();
        assert!(store.read_note("k1").await.unwrap().is_none());

        // Deleting again is not an error.
        store.delete_note("k1").await.unwrap();
    }

    #[tokio::test]
    async fn test_note_overwrites_in_place() {
        let (store, _dir) = store();
        store.write_note("k1", "first", "https://a.example/").await.unwrap();
        store.write_note("k1", "second", "https://a.example/").await.unwrap();
        assert_eq!(store.read_note("k1").await.unwrap().unwrap(), "second");
    }

    #[tokio::test]
    async fn test_drawing_write_read_delete() {
        let (store, _dir) = store();
        let scene = json!({"elements": [{"type": "rect"}], "appState": {"zoom": 1}});

        store.write_drawing("k2", &scene).await.unwrap();
        assert_eq!(store.read_drawing("k2").await.unwrap().unwrap(), scene);

        store.delete_drawing("k2").await.unwrap();
        assert!(store.read_drawing("k2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_drawing_is_an_error() {
        let (store, _dir) = store();
        tokio::fs::create_dir_all(store.drawings_dir()).await.unwrap();
        tokio::fs::write(store.drawings_dir().join("bad.json"), "{not json")
            .await
            .unwrap();

        assert!(matches!(store.read_drawing("bad").await, Err(ApiError::Corrupt(_))));
    }
}
