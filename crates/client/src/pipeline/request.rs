//! Request and result types for the extraction pipeline.

use std::path::Path;

use tempfile::TempPath;
use web2pdf_core::Error;

use crate::fetch::UrlSpec;

/// What to produce for each URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print the page as a browser shows it.
    Render,
    /// Fetch over plain HTTP and write the paragraph text as a PDF.
    ExtractText,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Render => "render",
            Mode::ExtractText => "extract_text",
        }
    }

    /// Archive entry name for the URL at 1-based `position`.
    pub fn entry_name(&self, position: usize) -> String {
        match self {
            Mode::Render => format!("output_{position}.pdf"),
            Mode::ExtractText => format!("scraped_data_{position}.pdf"),
        }
    }
}

/// An ordered, immutable batch of URLs plus the mode to run them in.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    urls: Vec<UrlSpec>,
    mode: Mode,
}

impl ExtractionRequest {
    /// Normalize every input. Order and duplicates are kept.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` if `urls` is empty.
    pub fn new<I, S>(urls: I, mode: Mode) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<UrlSpec> = urls.into_iter().map(|u| UrlSpec::new(u.as_ref())).collect();
        if urls.is_empty() {
            return Err(Error::InvalidInput("urls cannot be empty".into()));
        }
        Ok(Self { urls, mode })
    }

    pub fn urls(&self) -> &[UrlSpec] {
        &self.urls
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// A persisted output file for one URL.
///
/// The file is deleted when the artifact is dropped.
#[derive(Debug)]
pub struct Artifact {
    /// 1-based position of the source URL in the request.
    pub position: usize,
    pub url: UrlSpec,
    /// Name the file should carry inside the bundle.
    pub entry_name: String,
    path: TempPath,
}

impl Artifact {
    pub(crate) fn new(position: usize, url: UrlSpec, entry_name: String, path: TempPath) -> Self {
        Self { position, url, entry_name, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Terminal state of one URL.
#[derive(Debug)]
pub enum UrlStatus {
    Success(Artifact),
    Failure(Error),
}

/// Outcome for the URL at `position`.
#[derive(Debug)]
pub struct UrlOutcome {
    pub position: usize,
    pub url: UrlSpec,
    pub status: UrlStatus,
}

impl UrlOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, UrlStatus::Success(_))
    }
}

/// Per-URL outcomes in input order; at most one artifact per URL.
#[derive(Debug)]
pub struct PipelineResult {
    outcomes: Vec<UrlOutcome>,
}

impl PipelineResult {
    pub(crate) fn new(outcomes: Vec<UrlOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[UrlOutcome] {
        &self.outcomes
    }

    /// Successful artifacts, in input order.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            UrlStatus::Success(artifact) => Some(artifact),
            UrlStatus::Failure(_) => None,
        })
    }

    /// Failed URLs with their causes, in input order.
    pub fn failures(&self) -> impl Iterator<Item = (&UrlSpec, &Error)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            UrlStatus::Failure(err) => Some((&o.url, err)),
            UrlStatus::Success(_) => None,
        })
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Hand the artifacts over, dropping the failure records.
    pub fn into_artifacts(self) -> Vec<Artifact> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o.status {
                UrlStatus::Success(artifact) => Some(artifact),
                UrlStatus::Failure(_) => None,
            })
            .collect()
    }
}
