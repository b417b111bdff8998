//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `store_base_url` is empty
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `quiet_period_secs` is 0 or exceeds 1 hour
    /// - `cache_capacity` is 0 or exceeds 100000
    /// - `cache_prefix` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_base_url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "store_base_url".into(),
                reason: "must not be empty".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.quiet_period_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "quiet_period_secs".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        if self.quiet_period_secs > 3_600 {
            return Err(ConfigError::Invalid {
                field: "quiet_period_secs".into(),
                reason: "must not exceed 1 hour (3600s)".into(),
            });
        }

        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_capacity".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.cache_capacity > 100_000 {
            return Err(ConfigError::Invalid {
                field: "cache_capacity".into(),
                reason: "must not exceed 100000 entries".into(),
            });
        }

        if self.cache_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "cache_prefix".into(),
                reason: "must not be empty (bulk clear relies on it)".into(),
            });
        }

        Ok(())
    }
}
