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
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `max_concurrency` is 0 or above 16
    /// - `font_size` is outside 6..=72 points
    /// - `consent_pattern` is not a valid regex
    /// - `artifact_ttl_secs` or `sweep_interval_secs` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
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

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.max_concurrency == 0 || self.max_concurrency > 16 {
            return Err(ConfigError::Invalid {
                field: "max_concurrency".into(),
                reason: "must be between 1 and 16".into(),
            });
        }

        if !(6.0..=72.0).contains(&self.font_size) {
            return Err(ConfigError::Invalid { field: "font_size".into(), reason: "must be between 6 and 72".into() });
        }

        if let Err(e) = regex::Regex::new(&self.consent_pattern) {
            return Err(ConfigError::Invalid { field: "consent_pattern".into(), reason: e.to_string() });
        }

        if self.artifact_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "artifact_ttl_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sweep_interval_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.settle_delay_ms > self.navigation_timeout_ms {
            tracing::warn!(
                settle_delay_ms = self.settle_delay_ms,
                navigation_timeout_ms = self.navigation_timeout_ms,
                "settle delay is longer than the navigation timeout; every render will wait at least that long"
            );
        }

        Ok(())
    }
}
