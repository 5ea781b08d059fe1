//! HTTP error responses for the web2pdf server.
//!
//! Every failure is returned as `{"detail": "..."}`. Caller mistakes are 400,
//! everything else is 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use web2pdf_client::Mode;
use web2pdf_core::Error;

/// Error returned from a route handler.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {detail}")]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// Map a pipeline error for a request running in `mode`.
    ///
    /// A fully failed batch gets the mode's fixed message; the per-URL causes
    /// are already in the logs.
    pub fn for_mode(err: Error, mode: Mode) -> Self {
        match err {
            Error::BatchExhausted { .. } => {
                let detail = match mode {
                    Mode::Render => "Failed to generate PDFs",
                    Mode::ExtractText => "Failed to extract text",
                };
                Self { status: StatusCode::INTERNAL_SERVER_ERROR, detail: detail.into() }
            }
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, detail: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), "request failed: {}", self.detail);
        } else {
            tracing::info!(status = self.status.as_u16(), "request rejected: {}", self.detail);
        }

        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}
