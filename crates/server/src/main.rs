//! web2pdf server entry point.
//!
//! Boots the HTTP service that turns URL batches into zipped PDFs.
//! Logs go to stderr as JSON; set `RUST_LOG` to change the level.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use web2pdf_client::{
    ExtractionPipeline, FetchConfig, HttpTextExtractor, PdfLayout, PdfWriter, PipelineConfig, RenderConfig,
};
use web2pdf_core::{AppConfig, ArtifactStore};

mod bundle;
mod error;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(bind_addr = %config.bind_addr, artifact_dir = %config.artifact_dir.display(), "starting web2pdf");

    let store = Arc::new(ArtifactStore::open(&config.artifact_dir)?);
    let stale = store.sweep_stale_processes(config.artifact_ttl());
    if stale > 0 {
        tracing::info!(removed = stale, "removed artifact directories from earlier runs");
    }

    let sweeper = tokio::spawn(sweep_loop(store.clone(), config.sweep_interval(), config.artifact_ttl()));

    let renderer = build_renderer(&config)?;
    let extractor = Arc::new(HttpTextExtractor::new(FetchConfig::from(&config))?);
    let pipeline = Arc::new(ExtractionPipeline::new(
        renderer.clone(),
        extractor,
        PdfWriter::new(PdfLayout::from(&config)),
        PipelineConfig::from(&config),
    ));

    let app = routes::router(routes::AppState { pipeline, store });
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.abort();
    #[cfg(feature = "render")]
    renderer.shutdown().await;
    tracing::info!("web2pdf stopped");

    Ok(())
}

async fn sweep_loop(store: Arc<ArtifactStore>, every: Duration, ttl: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.tick().await;

    loop {
        interval.tick().await;
        let store = store.clone();
        match tokio::task::spawn_blocking(move || store.sweep(ttl)).await {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed, "swept stale request directories"),
            Err(e) => tracing::warn!("sweep task failed: {e}"),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(feature = "render")]
type Renderer = web2pdf_client::HeadlessRenderer;

#[cfg(not(feature = "render"))]
type Renderer = web2pdf_client::DisabledRenderer;

#[cfg(feature = "render")]
fn build_renderer(config: &AppConfig) -> Result<Arc<Renderer>> {
    let render_config = RenderConfig::try_from(config)?;
    Ok(Arc::new(Renderer::new(render_config)))
}

#[cfg(not(feature = "render"))]
fn build_renderer(config: &AppConfig) -> Result<Arc<Renderer>> {
    RenderConfig::try_from(config)?;
    tracing::warn!("built without the render feature; /web2pdf will fail every url");
    Ok(Arc::new(Renderer))
}
