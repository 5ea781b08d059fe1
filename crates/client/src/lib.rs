//! Client code for web2pdf.
//!
//! This crate provides the HTTP fetch path, paragraph text extraction, the
//! text-to-PDF writer, headless browser rendering, and the pipeline that ties
//! them together for a batch of URLs.

pub mod extract;
pub mod fetch;
pub mod pdf;
pub mod pipeline;
pub mod render;

#[cfg(test)]
mod test_support;

pub use extract::{HttpTextExtractor, TextExtractor, paragraph_text};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, UrlError, UrlSpec, normalize};
pub use pdf::{PdfLayout, PdfWriter};
pub use pipeline::{
    Artifact, ExtractionPipeline, ExtractionRequest, Mode, PipelineConfig, PipelineResult, UrlOutcome, UrlStatus,
};
pub use render::{DisabledRenderer, PageRenderer, RenderConfig, RenderError};

#[cfg(feature = "render")]
pub use render::HeadlessRenderer;
