//! Headless browser rendering to PDF.
//!
//! This module provides a renderer trait and, behind the `render` feature, an
//! implementation using chromiumoxide for headless Chrome/Chromium control.
//!
//! Each render runs in its own tab so concurrent requests never share
//! navigation state. The tab is closed whether or not the capture succeeded.

#[cfg(feature = "render")]
mod headless;

#[cfg(feature = "render")]
pub use headless::HeadlessRenderer;

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use web2pdf_core::AppConfig;

use crate::fetch::UrlSpec;

/// Errors that can occur during page rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Print-to-PDF failed or returned nothing.
    #[error("print to PDF failed: {0}")]
    Print(String),

    /// Timeout waiting for the page.
    #[error("render timeout after {0}ms")]
    Timeout(u64),

    /// Browser closed unexpectedly.
    #[error("browser closed unexpectedly")]
    BrowserClosed,

    /// This build has no browser support.
    #[error("rendering is disabled")]
    Disabled,
}

impl From<RenderError> for web2pdf_core::Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Disabled => web2pdf_core::Error::RenderDisabled,
            other => web2pdf_core::Error::RenderFailed(other.to_string()),
        }
    }
}

/// Options for rendering pages.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Fixed wait after navigation and again after the consent attempt (default: 5s).
    pub settle_delay: Duration,

    /// How long to look for a consent button (default: 10s).
    pub consent_timeout: Duration,

    /// Matched against the visible text of each `<button>`.
    pub consent_pattern: Regex,

    /// Bound on navigation and on print-to-PDF (default: 30s).
    pub navigation_timeout: Duration,

    /// Explicit browser executable; auto-detected when `None`.
    pub chrome_path: Option<PathBuf>,
}

pub const DEFAULT_CONSENT_PATTERN: &str = r"(?i)\b(accept|agree)\b";

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(5000),
            consent_timeout: Duration::from_millis(10_000),
            consent_pattern: Regex::new(DEFAULT_CONSENT_PATTERN).expect("invalid consent pattern"),
            navigation_timeout: Duration::from_millis(30_000),
            chrome_path: None,
        }
    }
}

impl TryFrom<&AppConfig> for RenderConfig {
    type Error = web2pdf_core::Error;

    fn try_from(config: &AppConfig) -> Result<Self, Self::Error> {
        let consent_pattern = Regex::new(&config.consent_pattern)
            .map_err(|e| web2pdf_core::Error::InvalidInput(format!("consent_pattern: {e}")))?;

        Ok(Self {
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            consent_timeout: Duration::from_millis(config.consent_timeout_ms),
            consent_pattern,
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            chrome_path: config.chrome_path.clone(),
        })
    }
}

impl RenderConfig {
    /// Whether a button's visible text reads like a consent/accept control.
    pub fn is_consent_label(&self, text: &str) -> bool {
        let text = text.trim();
        !text.is_empty() && self.consent_pattern.is_match(text)
    }
}

/// Renderer trait for headless browser page capture.
#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    /// Load `url` and return the page printed as PDF bytes.
    async fn render_pdf(&self, url: &UrlSpec) -> Result<Vec<u8>, RenderError>;
}

/// Renderer used when the binary is built without browser support.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRenderer;

#[async_trait::async_trait]
impl PageRenderer for DisabledRenderer {
    async fn render_pdf(&self, _url: &UrlSpec) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_config_default() {
        let config = RenderConfig::default();
        assert_eq!(config.settle_delay, Duration::from_secs(5));
        assert_eq!(config.consent_timeout, Duration::from_secs(10));
        assert!(config.chrome_path.is_none());
    }

    #[test]
    fn test_render_config_from_app_config() {
        let app = AppConfig { settle_delay_ms: 100, consent_pattern: "(?i)ok".into(), ..Default::default() };
        let config = RenderConfig::try_from(&app).unwrap();
        assert_eq!(config.settle_delay, Duration::from_millis(100));
        assert!(config.is_consent_label("OK"));
    }

    #[test]
    fn test_render_config_rejects_bad_pattern() {
        let app = AppConfig { consent_pattern: "[".into(), ..Default::default() };
        assert!(RenderConfig::try_from(&app).is_err());
    }

    #[test]
    fn test_consent_labels() {
        let config = RenderConfig::default();
        assert!(config.is_consent_label("Accept"));
        assert!(config.is_consent_label("  Accept all cookies "));
        assert!(config.is_consent_label("I agree"));
        assert!(config.is_consent_label("ACCEPT"));
        assert!(!config.is_consent_label("Acceptance policy"));
        assert!(!config.is_consent_label("Reject all"));
        assert!(!config.is_consent_label(""));
    }

    #[test]
    fn test_render_error_conversion() {
        let err: web2pdf_core::Error = RenderError::Timeout(30_000).into();
        assert!(matches!(&err, web2pdf_core::Error::RenderFailed(msg) if msg.contains("30000ms")));

        let err: web2pdf_core::Error = RenderError::Disabled.into();
        assert!(matches!(err, web2pdf_core::Error::RenderDisabled));
    }

    #[tokio::test]
    async fn test_disabled_renderer() {
        let result = DisabledRenderer.render_pdf(&UrlSpec::new("example.com")).await;
        assert!(matches!(result, Err(RenderError::Disabled)));
    }
}
