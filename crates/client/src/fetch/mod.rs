//! HTTP fetch for text extraction.
//!
//! - Bounded request timeout (default 10s); exceeding it is `FETCH_TIMEOUT`
//! - Non-2xx responses are `HTTP_ERROR`
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)

pub mod url;

use bytes::{Bytes, BytesMut};
use encoding_rs::{Encoding, UTF_8};
use reqwest::Url;
use reqwest::{Client, header};
use std::time::{Duration, Instant};

pub use url::{UrlError, UrlSpec, normalize};

use web2pdf_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "web2pdf/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "web2pdf/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(10_000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
}

impl FetchResponse {
    /// Body decoded with the Content-Type charset, or a BOM, falling back to
    /// UTF-8. Malformed sequences become U+FFFD.
    pub fn text(&self) -> String {
        let encoding = self
            .content_type
            .as_deref()
            .and_then(charset_label)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);

        let (text, _, _) = encoding.decode(&self.bytes);
        text.into_owned()
    }
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// HTTP fetch client.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    ///
    /// The body is read chunk by chunk and abandoned as soon as it passes
    /// `max_bytes`, whether or not the server sent a Content-Length.
    pub async fn fetch(&self, spec: &UrlSpec) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = spec.to_url()?;

        let mut response = self
            .http
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!("{url}: status {}", status.as_u16())));
        }

        let max_bytes = self.config.max_bytes;
        if let Some(len) = response.content_length()
            && len as usize > max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{url}: {len} bytes exceeds {max_bytes}")));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.transport_error(&url, e))? {
            if body.len() + chunk.len() > max_bytes {
                return Err(Error::FetchTooLarge(format!("{url}: body exceeds {max_bytes} bytes")));
            }
            body.extend_from_slice(&chunk);
        }
        let bytes = body.freeze();

        tracing::debug!(
            url = %url,
            final_url = %final_url,
            status = status.as_u16(),
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(FetchResponse { url, content_type, bytes })
    }

    fn transport_error(&self, url: &Url, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::FetchTimeout(format!("{url}: no response within {}ms", self.config.timeout.as_millis()))
        } else {
            Error::HttpError(format!("{url}: network error: {err}"))
        }
    }
}
