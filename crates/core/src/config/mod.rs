//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (URLMARK_*)
//! 2. TOML config file (if URLMARK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (URLMARK_*)
/// 2. TOML config file (if URLMARK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the annotation store API.
    ///
    /// Set via URLMARK_STORE_BASE_URL environment variable.
    #[serde(default = "default_store_base_url")]
    pub store_base_url: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via URLMARK_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Autosave quiet period in seconds.
    ///
    /// Edits arriving within this window of each other coalesce into a
    /// single deferred save. Set via URLMARK_QUIET_PERIOD_SECS.
    #[serde(default = "default_quiet_period_secs")]
    pub quiet_period_secs: u64,

    /// Path to the SQLite database backing the local artifact cache.
    ///
    /// Set via URLMARK_CACHE_DB_PATH environment variable.
    #[serde(default = "default_cache_db_path")]
    pub cache_db_path: PathBuf,

    /// Maximum number of entries the local cache retains.
    ///
    /// Set via URLMARK_CACHE_CAPACITY environment variable.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Namespace prefix for cache keys.
    ///
    /// Only rows carrying this prefix belong to the subsystem; bulk clears
    /// leave everything else untouched. Set via URLMARK_CACHE_PREFIX.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Bind address for the annotation store server.
    ///
    /// Set via URLMARK_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory where the server persists notes as Markdown files.
    ///
    /// Set via URLMARK_NOTES_DIR environment variable.
    #[serde(default = "default_notes_dir")]
    pub notes_dir: PathBuf,

    /// Directory where the server persists drawings as JSON files.
    ///
    /// Set via URLMARK_DRAWINGS_DIR environment variable.
    #[serde(default = "default_drawings_dir")]
    pub drawings_dir: PathBuf,
}

fn default_store_base_url() -> String {
    "http://127.0.0.1:3001/api".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_quiet_period_secs() -> u64 {
    30
}

fn default_cache_db_path() -> PathBuf {
    PathBuf::from("./urlmark-cache.sqlite")
}

fn default_cache_capacity() -> usize {
    50
}

fn default_cache_prefix() -> String {
    "summary:".into()
}

fn default_bind_addr() -> String {
    "127.0.0.1:3001".into()
}

fn default_notes_dir() -> PathBuf {
    PathBuf::from("./urlmark-data/notes")
}

fn default_drawings_dir() -> PathBuf {
    PathBuf::from("./urlmark-data/drawings")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_base_url: default_store_base_url(),
            timeout_ms: default_timeout_ms(),
            quiet_period_secs: default_quiet_period_secs(),
            cache_db_path: default_cache_db_path(),
            cache_capacity: default_cache_capacity(),
            cache_prefix: default_cache_prefix(),
            bind_addr: default_bind_addr(),
            notes_dir: default_notes_dir(),
            drawings_dir: default_drawings_dir(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Autosave quiet period as Duration.
    pub fn quiet_period(&self) -> Duration {
        Duration::from_secs(self.quiet_period_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `URLMARK_`
    /// 2. TOML file from `URLMARK_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("URLMARK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("URLMARK_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
