//! URL batch to artifact files.
//!
//! For each URL, in order:
//!
//! ```text
//! Pending -> Rendering | Fetching -> Persisting -> Done
//!    \__________________\_______________\_______-> Failed
//! ```
//!
//! The first failure is terminal for that URL and is recorded in its outcome;
//! it never aborts the rest of the batch. Only a batch in which every URL
//! failed is an error for the caller.

pub mod request;

pub use request::{Artifact, ExtractionRequest, Mode, PipelineResult, UrlOutcome, UrlStatus};

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream;
use web2pdf_core::{AppConfig, Error, ErrorKind, RequestScope};

use crate::extract::TextExtractor;
use crate::fetch::UrlSpec;
use crate::pdf::PdfWriter;
use crate::render::PageRenderer;

const ARTIFACT_SUFFIX: &str = ".pdf";

/// Pipeline tuning.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// URLs in flight at once within one request (default: 1, sequential).
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_concurrency: 1 }
    }
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self { max_concurrency: config.max_concurrency }
    }
}

/// Drives renderer or extractor + writer for each URL and persists the output.
pub struct ExtractionPipeline {
    renderer: Arc<dyn PageRenderer>,
    extractor: Arc<dyn TextExtractor>,
    writer: PdfWriter,
    config: PipelineConfig,
}

impl ExtractionPipeline {
    pub fn new(
        renderer: Arc<dyn PageRenderer>, extractor: Arc<dyn TextExtractor>, writer: PdfWriter, config: PipelineConfig,
    ) -> Self {
        Self { renderer, extractor, writer, config }
    }

    /// Run every URL of `request`, writing artifacts into `scope`.
    ///
    /// Outcomes come back in input order regardless of `max_concurrency`.
    ///
    /// # Errors
    ///
    /// Returns `BATCH_EXHAUSTED` when no URL produced an artifact.
    pub async fn run(&self, request: &ExtractionRequest, scope: &RequestScope) -> Result<PipelineResult, Error> {
        let mode = request.mode();
        let total = request.len();
        let start = std::time::Instant::now();

        tracing::info!(mode = mode.as_str(), total, "pipeline started");

        let tasks: Vec<_> = request
            .urls()
            .iter()
            .enumerate()
            .map(|(i, url)| self.process(i + 1, url, mode, scope, total))
            .collect();

        let outcomes: Vec<UrlOutcome> = stream::iter(tasks)
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let result = PipelineResult::new(outcomes);

        tracing::info!(
            mode = mode.as_str(),
            total,
            succeeded = result.succeeded(),
            failed = result.failed(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pipeline finished"
        );

        if result.succeeded() == 0 {
            return Err(Error::BatchExhausted { total });
        }

        Ok(result)
    }

    async fn process(
        &self, position: usize, url: &UrlSpec, mode: Mode, scope: &RequestScope, total: usize,
    ) -> UrlOutcome {
        tracing::debug!(url = %url, position, total, "processing url");

        let status = match self.produce_and_persist(position, url, mode, scope).await {
            Ok(artifact) => {
                tracing::debug!(url = %url, position, path = %artifact.path().display(), "url done");
                UrlStatus::Success(artifact)
            }
            Err(err) => {
                log_failure(url, position, &err);
                UrlStatus::Failure(err)
            }
        };

        UrlOutcome { position, url: url.clone(), status }
    }

    async fn produce_and_persist(
        &self, position: usize, url: &UrlSpec, mode: Mode, scope: &RequestScope,
    ) -> Result<Artifact, Error> {
        let bytes = match mode {
            Mode::Render => self.renderer.render_pdf(url).await?,
            Mode::ExtractText => self.text_pdf(url).await?,
        };

        tracing::debug!(url = %url, position, bytes = bytes.len(), "persisting artifact");
        let path = scope.persist(ARTIFACT_SUFFIX, bytes).await?;

        Ok(Artifact::new(position, url.clone(), mode.entry_name(position), path))
    }

    async fn text_pdf(&self, url: &UrlSpec) -> Result<Vec<u8>, Error> {
        let text = self.extractor.extract_text(url).await?;
        if text.trim().is_empty() {
            return Err(Error::EmptyContent(format!("{url}: no paragraph text")));
        }

        let writer = self.writer.clone();
        tokio::task::spawn_blocking(move || writer.write(&text))
            .await
            .map_err(|e| Error::EncodingFailed(format!("writer task failed: {e}")))?
    }
}

fn log_failure(url: &UrlSpec, position: usize, err: &Error) {
    let kind = err.kind();
    if kind == ErrorKind::Storage {
        tracing::error!(url = %url, position, kind = %kind, "url failed: {err}");
    } else {
        tracing::warn!(url = %url, position, kind = %kind, "url failed: {err}");
    }
}
