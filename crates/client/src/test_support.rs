//! Local HTTP fixtures for fetch and extraction tests.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use bytes::Bytes;

pub const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Fixture Article</title></head>
<body>
    <h1>Heading is not a paragraph</h1>
    <p>First paragraph.</p>
    <div><p>Second <b>bold</b> paragraph.</p></div>
    <p>   </p>
    <p>Caf&eacute; &amp; cr&egrave;me &mdash; &#x4e2d;&#x6587;</p>
</body>
</html>"#;

pub const EMPTY_HTML: &str = "<html><body><div>No paragraphs here.</div></body></html>";

/// Serve the fixture pages on an ephemeral localhost port and return the base URL.
///
/// - `/article`: three non-empty paragraphs
/// - `/empty`: no `<p>` elements
/// - `/slow`: responds after two seconds
/// - `/stream`: 8 KiB of chunked HTML with no Content-Length
/// - `/latin1`: a paragraph encoded as windows-1252
/// - anything else: 404
pub async fn serve_fixture() -> String {
    let app = Router::new()
        .route("/article", get(|| async { Html(ARTICLE_HTML) }))
        .route("/empty", get(|| async { Html(EMPTY_HTML) }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Html(ARTICLE_HTML)
            }),
        )
        .route("/stream", get(|| async { stream_body() }))
        .route("/latin1", get(|| async { latin1_body() }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn stream_body() -> impl IntoResponse {
    let chunks = (0..8).map(|_| Ok::<_, std::io::Error>(Bytes::from(vec![b'x'; 1024])));
    ([(header::CONTENT_TYPE, "text/html")], Body::from_stream(futures_util::stream::iter(chunks)))
}

fn latin1_body() -> impl IntoResponse {
    let body: &'static [u8] = b"<html><body><p>Caf\xe9 cr\xe8me</p></body></html>";
    ([(header::CONTENT_TYPE, "text/html; charset=windows-1252")], body)
}
