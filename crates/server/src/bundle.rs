//! Zip packaging of pipeline artifacts.
//!
//! The archive is built in memory; once it is built the artifacts and their
//! request scope are dropped, which deletes every temporary file before the
//! response goes out.

use std::io::{Cursor, Write};

use web2pdf_client::Artifact;
use web2pdf_core::{Error, RequestScope};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// A finished archive.
#[derive(Debug)]
pub struct Bundle {
    pub bytes: Vec<u8>,
    pub entries: usize,
}

/// Zip `artifacts` in order under their entry names, then release the scope.
pub async fn package(artifacts: Vec<Artifact>, scope: RequestScope) -> Result<Bundle, Error> {
    let bundle = tokio::task::spawn_blocking(move || {
        let bundle = write_zip(&artifacts);
        drop(artifacts);
        if let Err(e) = scope.close() {
            tracing::warn!("failed to remove request scope: {e}");
        }
        bundle
    })
    .await
    .map_err(|e| Error::StorageFailed(format!("packaging task failed: {e}")))??;

    tracing::debug!(entries = bundle.entries, bytes = bundle.bytes.len(), "bundle written");
    Ok(bundle)
}

fn write_zip(artifacts: &[Artifact]) -> Result<Bundle, Error> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for artifact in artifacts {
        let data = std::fs::read(artifact.path()).map_err(|e| Error::storage(artifact.path(), e))?;
        zip.start_file(artifact.entry_name.as_str(), options)
            .map_err(|e| Error::StorageFailed(format!("{}: {e}", artifact.entry_name)))?;
        zip.write_all(&data)
            .map_err(|e| Error::StorageFailed(format!("{}: {e}", artifact.entry_name)))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| Error::StorageFailed(format!("zip finish: {e}")))?;

    Ok(Bundle { bytes: cursor.into_inner(), entries: artifacts.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::Arc;
    use web2pdf_client::{
        DisabledRenderer, ExtractionPipeline, ExtractionRequest, Mode, PdfWriter, PipelineConfig, TextExtractor, UrlSpec,
    };
    use web2pdf_core::ArtifactStore;

    struct EchoExtractor;

    #[async_trait::async_trait]
    impl TextExtractor for EchoExtractor {
        async fn extract_text(&self, url: &UrlSpec) -> Result<String, Error> {
            Ok(format!("Text of {url}."))
        }
    }

    #[tokio::test]
    async fn test_package_orders_entries_and_cleans_scope() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(root.path()).unwrap();
        let scope = store.scope().unwrap();
        let scope_path = scope.path().to_path_buf();

        let pipeline = ExtractionPipeline::new(
            Arc::new(DisabledRenderer),
            Arc::new(EchoExtractor),
            PdfWriter::default(),
            PipelineConfig::default(),
        );
        let request = ExtractionRequest::new(["a.com", "b.com", "c.com"], Mode::ExtractText).unwrap();
        let artifacts = pipeline.run(&request, &scope).await.unwrap().into_artifacts();

        let bundle = package(artifacts, scope).await.unwrap();
        assert_eq!(bundle.entries, 3);
        assert!(!scope_path.exists());

        let mut archive = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["scraped_data_1.pdf", "scraped_data_2.pdf", "scraped_data_3.pdf"]);
        assert_eq!(archive.by_index(0).unwrap().name(), "scraped_data_1.pdf");

        let mut first = Vec::new();
        archive.by_name("scraped_data_1.pdf").unwrap().read_to_end(&mut first).unwrap();
        assert!(first.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_package_empty_is_valid_archive() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(root.path()).unwrap();
        let scope = store.scope().unwrap();

        let bundle = package(Vec::new(), scope).await.unwrap();
        assert_eq!(bundle.entries, 0);
        let archive = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
