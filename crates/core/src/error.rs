//! Unified error types for web2pdf.
//!
//! Every variant renders as `CODE: detail` so log lines and HTTP error bodies
//! carry a stable, greppable prefix.

/// Failure families used when logging per-URL outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input (empty batch, unparseable URL).
    Input,
    /// Network/HTTP failure or timeout while fetching page text.
    Fetch,
    /// Browser navigation or print-to-PDF failure.
    Render,
    /// Text could not be mapped into the PDF writer's character range.
    Encoding,
    /// Temporary storage could not be allocated or written.
    Storage,
    /// Every URL in the batch failed.
    BatchExhausted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Input => "input",
            ErrorKind::Fetch => "fetch",
            ErrorKind::Render => "render",
            ErrorKind::Encoding => "encoding",
            ErrorKind::Storage => "storage",
            ErrorKind::BatchExhausted => "batch_exhausted",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error types for the web2pdf service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an empty URL list).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// URL could not be parsed or uses an unsupported scheme.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// HTTP error response or transport failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Page fetched fine but yielded no text to write.
    #[error("EMPTY_CONTENT: {0}")]
    EmptyContent(String),

    /// Render mode is disabled in this build.
    #[error("RENDER_DISABLED")]
    RenderDisabled,

    /// Render failed.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),

    /// Text could not be encoded into a PDF.
    #[error("ENCODING_FAILED: {0}")]
    EncodingFailed(String),

    /// Temporary file allocation or write failed.
    #[error("STORAGE_FAILED: {0}")]
    StorageFailed(String),

    /// No URL in the batch produced an artifact.
    #[error("BATCH_EXHAUSTED: all {total} url(s) failed")]
    BatchExhausted { total: usize },
}

impl Error {
    /// Classify this error into its failure family.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) | Error::InvalidUrl(_) => ErrorKind::Input,
            Error::FetchTimeout(_) | Error::FetchTooLarge(_) | Error::HttpError(_) | Error::EmptyContent(_) => {
                ErrorKind::Fetch
            }
            Error::RenderDisabled | Error::RenderFailed(_) => ErrorKind::Render,
            Error::EncodingFailed(_) => ErrorKind::Encoding,
            Error::StorageFailed(_) => ErrorKind::Storage,
            Error::BatchExhausted { .. } => ErrorKind::BatchExhausted,
        }
    }

    /// Build a storage error that names the offending path.
    pub fn storage(path: &std::path::Path, err: std::io::Error) -> Self {
        Error::StorageFailed(format!("{}: {}", path.display(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_display() {
        let err = Error::HttpError("status 404".to_string());
        assert!(err.to_string().contains("HTTP_ERROR"));
        assert!(err.to_string().contains("status 404"));
    }

    #[test]
    fn test_batch_exhausted_display() {
        let err = Error::BatchExhausted { total: 3 };
        assert_eq!(err.to_string(), "BATCH_EXHAUSTED: all 3 url(s) failed");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::FetchTimeout("10s".into()).kind(), ErrorKind::Fetch);
        assert_eq!(Error::FetchTooLarge("big".into()).kind(), ErrorKind::Fetch);
        assert_eq!(Error::EmptyContent("http://a/".into()).kind(), ErrorKind::Fetch);
        assert_eq!(Error::RenderDisabled.kind(), ErrorKind::Render);
        assert_eq!(Error::EncodingFailed("x".into()).kind(), ErrorKind::Encoding);
        assert_eq!(Error::InvalidUrl("x".into()).kind(), ErrorKind::Input);
        assert_eq!(Error::BatchExhausted { total: 1 }.kind(), ErrorKind::BatchExhausted);
    }

    #[test]
    fn test_storage_error_names_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::storage(Path::new("/tmp/web2pdf/x.pdf"), io);
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("/tmp/web2pdf/x.pdf"));
        assert!(err.to_string().contains("denied"));
    }
}
