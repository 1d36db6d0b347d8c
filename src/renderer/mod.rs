//! Page renderers: turn a category URL into the HTML of the loaded page.
//!
//! [`ChromiumRenderer`] executes the page's scripts in headless Chromium and
//! hands back the DOM once the product grid has settled. [`HttpRenderer`]
//! fetches the raw HTML for catalogs that render server-side.

pub mod chromium;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{RendererKind, ServiceConfig};
use crate::error::RenderError;

pub use chromium::ChromiumRenderer;
pub use http::HttpRenderer;

/// Something that can load a page and return its rendered HTML.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// Build the renderer selected in `config`.
pub async fn from_config(config: &ServiceConfig) -> Result<Arc<dyn PageRenderer>, RenderError> {
    let renderer: Arc<dyn PageRenderer> = match config.renderer {
        RendererKind::Chromium => Arc::new(ChromiumRenderer::launch(config).await?),
        RendererKind::Http => Arc::new(HttpRenderer::new(config)?),
    };
    Ok(renderer)
}
