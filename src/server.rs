//! HTTP front end.
//!
//! `GET /products?url=...` renders a category page and returns the products
//! found on it; `GET /health` reports liveness.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::extractor::ProductExtractor;
use crate::models::ExtractionResult;
use crate::renderer::PageRenderer;

/// State shared by all request handlers.
pub struct AppState {
    pub extractor: ProductExtractor,
    pub renderer: Arc<dyn PageRenderer>,
}

impl AppState {
    pub fn new(extractor: ProductExtractor, renderer: Arc<dyn PageRenderer>) -> Self {
        Self { extractor, renderer }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/products", get(products))
        .layer(cors)
        .with_state(state)
}

/// Serve on all interfaces until the process is stopped.
pub async fn start(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("scraper worker listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "ok": true }))
}

#[derive(Debug, Deserialize, Default)]
struct ProductsParams {
    url: Option<String>,
}

async fn products(
    Query(params): Query<ProductsParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let site = state.extractor.site();
    let url = params
        .url
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| site.default_category_url());

    if !site.permits(&url) {
        warn!(url = %url, "rejected url outside permitted origin");
        return Err(ApiError::InvalidUrl(url));
    }

    let html = state.renderer.render(&url).await.map_err(|e| {
        error!(url = %url, "scrape failed: {e}");
        ApiError::from(e)
    })?;

    // parsing is CPU-bound; keep it off the async workers
    let worker = Arc::clone(&state);
    let source = url.clone();
    let result = tokio::task::spawn_blocking(move || worker.extractor.extract_from_html(&html, &source))
        .await
        .map_err(|e| ApiError::Extraction(e.to_string()))?;

    info!(url = %url, count = result.count, total_found = result.total_found, "extracted products");
    Ok(Json(result))
}
