//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WEB2PDF_*)
//! 2. TOML config file (if WEB2PDF_CONFIG_FILE set)
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
/// 1. Environment variables (WEB2PDF_*)
/// 2. TOML config file (if WEB2PDF_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server listens on.
    ///
    /// Set via WEB2PDF_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Root directory for the process-scoped artifact directory.
    ///
    /// Set via WEB2PDF_ARTIFACT_DIR environment variable.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Age in seconds after which unclaimed request directories are swept.
    #[serde(default = "default_artifact_ttl_secs")]
    pub artifact_ttl_secs: u64,

    /// Period in seconds of the background sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via WEB2PDF_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via WEB2PDF_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Fixed wait applied after navigation and again after consent dismissal.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// How long to look for a consent button before giving up.
    #[serde(default = "default_consent_timeout_ms")]
    pub consent_timeout_ms: u64,

    /// Regex matched against the visible text of candidate consent buttons.
    #[serde(default = "default_consent_pattern")]
    pub consent_pattern: String,

    /// Upper bound on page navigation and print-to-PDF.
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Explicit Chrome/Chromium executable. Auto-detected when unset.
    ///
    /// Set via WEB2PDF_CHROME_PATH environment variable.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Number of URLs processed at once within one request.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Font size in points for text PDFs.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".into()
}

fn default_artifact_dir() -> PathBuf {
    std::env::temp_dir().join("web2pdf")
}

fn default_artifact_ttl_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_user_agent() -> String {
    "web2pdf/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_max_redirects() -> usize {
    5
}

fn default_settle_delay_ms() -> u64 {
    5_000
}

fn default_consent_timeout_ms() -> u64 {
    10_000
}

fn default_consent_pattern() -> String {
    r"(?i)\b(accept|agree)\b".into()
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_max_concurrency() -> usize {
    1
}

fn default_font_size() -> f32 {
    12.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            artifact_dir: default_artifact_dir(),
            artifact_ttl_secs: default_artifact_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
            settle_delay_ms: default_settle_delay_ms(),
            consent_timeout_ms: default_consent_timeout_ms(),
            consent_pattern: default_consent_pattern(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            chrome_path: None,
            max_concurrency: default_max_concurrency(),
            font_size: default_font_size(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn artifact_ttl(&self) -> Duration {
        Duration::from_secs(self.artifact_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WEB2PDF_`
    /// 2. TOML file from `WEB2PDF_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("WEB2PDF_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WEB2PDF_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
