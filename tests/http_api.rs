//! HTTP front end, driven through the router with a stub renderer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use catalog_scraper::error::RenderError;
use catalog_scraper::renderer::PageRenderer;
use catalog_scraper::server::{router, AppState};
use catalog_scraper::ProductExtractor;
use serde_json::Value;
use tower::ServiceExt;

const CATEGORY_PAGE: &str = include_str!("fixtures/category_page.html");

/// Serves canned HTML and records which URLs were requested.
struct StubRenderer {
    html: Result<String, String>,
    calls: AtomicUsize,
    last_url: Mutex<Option<String>>,
}

impl StubRenderer {
    fn serving(html: &str) -> Arc<Self> {
        Arc::new(Self {
            html: Ok(html.to_string()),
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        })
    }

    fn failing(cause: &str) -> Arc<Self> {
        Arc::new(Self {
            html: Err(cause.to_string()),
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        })
    }
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.to_string());
        self.html.clone().map_err(RenderError::Navigation)
    }
}

async fn get(renderer: Arc<StubRenderer>, uri: &str) -> (StatusCode, Value) {
    let state = Arc::new(AppState::new(ProductExtractor::default(), renderer));
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get(StubRenderer::serving(""), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "ok": true }));
}

#[tokio::test]
async fn products_returns_extraction_result() {
    let renderer = StubRenderer::serving(CATEGORY_PAGE);
    let (status, body) = get(
        renderer.clone(),
        "/products?url=https%3A%2F%2Fnautichandler.com%2Fen%2F100390-painting",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "https://nautichandler.com/en/100390-painting");
    assert_eq!(body["count"], 3);
    assert_eq!(body["totalFound"], 3);
    assert!(body["extractedAt"].is_string());

    let first = &body["products"][0];
    assert_eq!(first["title"], "Antifouling paint 750ml");
    assert_eq!(first["price"], "€42,41");
    assert_eq!(first["oldPrice"], "€49,90");
    assert_eq!(first["stock"], Value::Null);
    assert_eq!(
        first["sourceUrl"],
        "https://nautichandler.com/en/painting/101-antifouling-paint.html"
    );
    assert_eq!(body["products"][1]["oldPrice"], Value::Null);

    assert_eq!(
        renderer.last_url.lock().unwrap().as_deref(),
        Some("https://nautichandler.com/en/100390-painting")
    );
}

#[tokio::test]
async fn missing_url_falls_back_to_default_category() {
    let renderer = StubRenderer::serving("<html><body></body></html>");
    let (status, body) = get(renderer.clone(), "/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "https://nautichandler.com/en/100390-painting");
    assert_eq!(body["count"], 0);
    assert_eq!(body["products"], serde_json::json!([]));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_url_falls_back_to_default_category() {
    let renderer = StubRenderer::serving(CATEGORY_PAGE);
    let (status, body) = get(renderer.clone(), "/products?url=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "https://nautichandler.com/en/100390-painting");
    assert_eq!(body["count"], 3);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        renderer.last_url.lock().unwrap().as_deref(),
        Some("https://nautichandler.com/en/100390-painting")
    );
}

#[tokio::test]
async fn foreign_url_is_rejected_before_rendering() {
    let renderer = StubRenderer::serving(CATEGORY_PAGE);
    let (status, body) = get(renderer.clone(), "/products?url=https%3A%2F%2Fexample.com%2Fen%2Fx").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "Invalid url" }));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn render_failure_is_a_bad_gateway_with_details() {
    let renderer = StubRenderer::failing("net::ERR_NAME_NOT_RESOLVED");
    let (status, body) = get(renderer, "/products?url=https%3A%2F%2Fnautichandler.com%2Fen%2F1-x").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Scrape failed");
    assert_eq!(body["details"], "navigation failed: net::ERR_NAME_NOT_RESOLVED");
}
