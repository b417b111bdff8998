//! Bounded key/value operations for derived artifacts.
//!
//! Entries live in a shared `kv` table under a namespace prefix. Every put
//! re-enforces the capacity invariant by deleting the oldest namespaced
//! entries; there is no background sweep and no TTL.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_rusqlite::params;

/// JSON envelope stored per cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    /// The cached artifact.
    pub value: Value,
    /// Write time, epoch milliseconds. Doubles as the eviction sort key.
    pub timestamp: i64,
    /// URL the artifact was derived from.
    pub source_url: String,
}

/// Fixed-capacity cache over a [`CacheDb`], scoped to a key prefix.
///
/// After any sequence of puts the number of live namespaced entries never
/// exceeds `capacity`; when a write would exceed it, the entries with the
/// smallest timestamps are evicted (key order breaks ties deterministically).
/// Rows outside the namespace are never touched.
#[derive(Clone, Debug)]
pub struct BoundedCache {
    db: CacheDb,
    prefix: String,
    capacity: usize,
}

impl BoundedCache {
    /// Create a cache view over `db`, namespaced by `prefix`.
    pub fn new(db: CacheDb, prefix: impl Into<String>, capacity: usize) -> Self {
        Self { db, prefix: prefix.into(), capacity }
    }

    /// The namespace prefix applied to every key.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The maximum number of entries retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Look up a cached value.
    ///
    /// Absence is a normal outcome. A stored envelope that no longer parses
    /// is treated as absent, not as an error.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        let full_key = self.namespaced(key);
        let row: Option<String> = self
            .db
            .conn
            .call(move |conn| {
                let result = conn.query_row("SELECT envelope FROM kv WHERE key = ?1", params![full_key], |row| {
                    row.get(0)
                });
                match result {
                    Ok(envelope) => Ok(Some(envelope)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some(raw) = row else { return Ok(None) };
        match serde_json::from_str::<CacheEnvelope>(&raw) {
            Ok(envelope) => Ok(Some(envelope.value)),
            Err(e) => {
                tracing::debug!(key, error = %e, "corrupted cache envelope, treating as miss");
                Ok(None)
            }
        }
    }

    /// Write or overwrite an entry, then enforce the capacity bound.
    ///
    /// The entry is stamped with the current wall-clock time.
    pub async fn put(&self, key: &str, value: &Value, source_url: &str) -> Result<(), Error> {
        self.put_at(key, value, source_url, chrono::Utc::now().timestamp_millis())
            .await
    }

    // Timestamp-explicit variant; put() delegates here and tests use it to
    // drive eviction order deterministically.
    async fn put_at(&self, key: &str, value: &Value, source_url: &str, saved_at: i64) -> Result<(), Error> {
        let full_key = self.namespaced(key);
        let prefix = self.prefix.clone();
        let capacity = self.capacity as i64;
        // Value -> String encoding is infallible for serde_json::Value.
        let envelope = serde_json::to_string(&CacheEnvelope {
            value: value.clone(),
            timestamp: saved_at,
            source_url: source_url.to_string(),
        })
        .unwrap_or_else(|_| "{}".to_string());

        self.db
            .conn
            .call(move |conn| -> Result<(), tokio_rusqlite::rusqlite::Error> {
                conn.execute(
                    "INSERT INTO kv (key, envelope, saved_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET
                        envelope = excluded.envelope,
                        saved_at = excluded.saved_at",
                    params![full_key, envelope, saved_at],
                )?;

                // Oldest-first eviction down to capacity, scoped to the
                // namespace. substr() avoids LIKE wildcard surprises when
                // the prefix contains '_' or '%'.
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM kv WHERE substr(key, 1, length(?1)) = ?1",
                    params![prefix],
                    |row| row.get(0),
                )?;
                if count > capacity {
                    conn.execute(
                        "DELETE FROM kv WHERE key IN (
                            SELECT key FROM kv
                            WHERE substr(key, 1, length(?1)) = ?1
                            ORDER BY saved_at ASC, key ASC
                            LIMIT ?2
                        )",
                        params![prefix, count - capacity],
                    )?;
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove every namespaced entry, returning the count removed.
    ///
    /// Rows outside the namespace are untouched.
    pub async fn clear(&self) -> Result<u64, Error> {
        let prefix = self.prefix.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, tokio_rusqlite::rusqlite::Error> {
                let removed = conn.execute(
                    "DELETE FROM kv WHERE substr(key, 1, length(?1)) = ?1",
                    params![prefix],
                )?;
                Ok(removed as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of live namespaced entries.
    pub async fn size(&self) -> Result<u64, Error> {
        let prefix = self.prefix.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, tokio_rusqlite::rusqlite::Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM kv WHERE substr(key, 1, length(?1)) = ?1",
                    params![prefix],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Keys currently live in the namespace, prefix stripped.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        let prefix = self.prefix.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, tokio_rusqlite::rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
                )?;
                let keys = stmt
                    .query_map(params![prefix], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys
                    .into_iter()
                    .map(|k| k[prefix.len()..].to_string())
                    .collect())
            })
            .await
            .map_err(Error::from)
    }
}
