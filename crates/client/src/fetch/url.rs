//! Caller-supplied URL normalization.

use std::fmt;

/// Error type for URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for web2pdf_core::Error {
    fn from(err: UrlError) -> Self {
        web2pdf_core::Error::InvalidUrl(err.to_string())
    }
}

const DEFAULT_SCHEME: &str = "http://";

/// A caller-supplied URL that always carries a scheme.
///
/// Construction trims surrounding whitespace and prepends `http://` when no
/// scheme is present. Normalizing an already normalized value is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlSpec(String);

impl UrlSpec {
    pub fn new(input: &str) -> Self {
        Self(normalize(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a `url::Url`, accepting only http and https.
    pub fn to_url(&self) -> Result<url::Url, UrlError> {
        if self.0.is_empty() {
            return Err(UrlError::Empty);
        }

        let parsed = url::Url::parse(&self.0).map_err(|e| UrlError::InvalidUrl(format!("{}: {e}", self.0)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(UrlError::InvalidUrl(format!("{}: missing host", self.0)));
        }

        Ok(parsed)
    }
}

impl fmt::Display for UrlSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UrlSpec {
    fn from(input: &str) -> Self {
        Self::new(input)
    }
}

/// Trim `input` and prepend `http://` if it has no scheme.
///
/// Empty input stays empty so the failure surfaces when the URL is used.
pub fn normalize(input: &str) -> String {
    let trimmed = input.trim();

    if trimmed.is_empty() || has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{trimmed}")
    }
}

fn has_scheme(s: &str) -> bool {
    match s.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
