//! Plain-HTTP text extraction.
//!
//! Fetches a page without a browser and keeps only the text of its paragraph
//! elements. The `TextExtractor` trait lets the pipeline run against a fake in
//! tests and keeps the HTTP stack out of its signature.

pub mod paragraphs;

pub use paragraphs::{PARAGRAPH_SEPARATOR, paragraph_text};

use web2pdf_core::Error;

use crate::fetch::{FetchClient, FetchConfig, UrlSpec};

/// Source of page text for the extract-text mode.
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    /// Fetch `url` and return the joined paragraph text.
    ///
    /// A page without paragraphs yields `Ok("")`, not an error.
    async fn extract_text(&self, url: &UrlSpec) -> Result<String, Error>;
}

/// `TextExtractor` backed by a reqwest fetch and scraper parse.
pub struct HttpTextExtractor {
    client: FetchClient,
}

impl HttpTextExtractor {
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        Ok(Self { client: FetchClient::new(config)? })
    }
}

#[async_trait::async_trait]
impl TextExtractor for HttpTextExtractor {
    async fn extract_text(&self, url: &UrlSpec) -> Result<String, Error> {
        let response = self.client.fetch(url).await?;
        let text = paragraph_text(&response.text());

        tracing::debug!(url = %url, chars = text.chars().count(), "extracted paragraph text");
        Ok(text)
    }
}
