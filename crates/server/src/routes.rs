//! HTTP routes.
//!
//! Both endpoints take `{"urls": [...]}` (or a comma-separated string) and
//! answer with a zip of one PDF per URL that succeeded. URLs that failed are
//! left out of the archive; their count is reported in `X-Failed-Count`.

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{HeaderName, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use web2pdf_client::{ExtractionPipeline, ExtractionRequest, Mode};
use web2pdf_core::{ArtifactStore, Error};

use crate::bundle::{self, ZIP_CONTENT_TYPE};
use crate::error::ApiError;

const BUNDLE_FILENAME: &str = "output.zip";
const ARTIFACT_COUNT_HEADER: &str = "x-artifact-count";
const FAILED_COUNT_HEADER: &str = "x-failed-count";

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ExtractionPipeline>,
    pub store: Arc<ArtifactStore>,
}

/// The `urls` field: a JSON array, or one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UrlList {
    Many(Vec<String>),
    Joined(String),
}

impl UrlList {
    /// Flatten to an ordered list. Blank entries of a joined string are dropped.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            UrlList::Many(urls) => urls,
            UrlList::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// Request body for both endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlsBody {
    pub urls: UrlList,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/web2pdf", post(web2pdf))
        .route("/web2text", post(web2text))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn web2pdf(
    State(state): State<AppState>, body: Result<Json<UrlsBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    handle(state, body, Mode::Render).await
}

async fn web2text(
    State(state): State<AppState>, body: Result<Json<UrlsBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    handle(state, body, Mode::ExtractText).await
}

async fn handle(
    state: AppState, body: Result<Json<UrlsBody>, JsonRejection>, mode: Mode,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| Error::InvalidInput(e.body_text()))?;
    let request = ExtractionRequest::new(body.urls.into_vec(), mode)?;

    tracing::info!(mode = mode.as_str(), urls = request.len(), "request received");

    let scope = state.store.scope()?;
    let result = state
        .pipeline
        .run(&request, &scope)
        .await
        .map_err(|e| ApiError::for_mode(e, mode))?;

    let failed = result.failed();
    let bundle = bundle::package(result.into_artifacts(), scope).await?;

    tracing::info!(
        mode = mode.as_str(),
        artifacts = bundle.entries,
        failed,
        bytes = bundle.bytes.len(),
        "bundle ready"
    );

    let headers = [
        (header::CONTENT_TYPE, ZIP_CONTENT_TYPE.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{BUNDLE_FILENAME}\"")),
        (HeaderName::from_static(ARTIFACT_COUNT_HEADER), bundle.entries.to_string()),
        (HeaderName::from_static(FAILED_COUNT_HEADER), failed.to_string()),
    ];

    Ok((headers, bundle.bytes).into_response())
}
