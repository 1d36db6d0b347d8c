//! Site and service configuration.
//!
//! Every site-specific constant the engine relies on lives in [`SiteConfig`], so
//! the same engine can be pointed at another catalog by swapping the config.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Constants describing the target catalog site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host, without a trailing slash.
    pub origin: String,
    /// Suffix that product-page links end with.
    pub product_suffix: String,
    /// Path fragments that mark informational pages sharing the card markup.
    pub excluded_path_fragments: Vec<String>,
    /// Currency mark whose presence in a price counts as a commerce signal.
    pub currency_symbol: String,
    /// Upper bound on products returned per page.
    pub max_results: usize,
    /// Category path used when a request names no URL.
    pub default_category_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://nautichandler.com".to_string(),
            product_suffix: ".html".to_string(),
            excluded_path_fragments: vec![
                "contact".to_string(),
                "privacy".to_string(),
                "terms".to_string(),
                "/content/".to_string(),
            ],
            currency_symbol: "€".to_string(),
            max_results: 40,
            default_category_path: "/en/100390-painting".to_string(),
        }
    }
}

impl SiteConfig {
    /// Origin with any trailing slash removed.
    pub fn origin(&self) -> &str {
        self.origin.trim_end_matches('/')
    }

    pub fn default_category_url(&self) -> String {
        let path = &self.default_category_path;
        if path.starts_with('/') {
            format!("{}{}", self.origin(), path)
        } else {
            format!("{}/{}", self.origin(), path)
        }
    }

    /// Whether `link` is a page under the permitted origin.
    pub fn permits(&self, link: &str) -> bool {
        if url::Url::parse(link).is_err() {
            return false;
        }
        link.starts_with(&format!("{}/", self.origin()))
    }
}

/// Which page renderer backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Headless Chromium; executes the page's JavaScript.
    Chromium,
    /// Plain HTTP fetch; for catalogs that render server-side.
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Settings for the renderer and the HTTP front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub site: SiteConfig,
    pub port: u16,
    pub renderer: RendererKind,
    pub navigation_timeout_ms: u64,
    /// Pause after consent dismissal so late scripts can fill the grid.
    pub settle_delay_ms: u64,
    pub user_agent: String,
    pub viewport: Viewport,
    /// Button labels tried in order when dismissing cookie banners.
    pub consent_button_labels: Vec<String>,
    pub chromium_path: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            port: 8080,
            renderer: RendererKind::Chromium,
            navigation_timeout_ms: 45_000,
            settle_delay_ms: 800,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/122 Safari/537.36".to_string(),
            viewport: Viewport { width: 1280, height: 800 },
            consent_button_labels: vec![
                "Accept all".to_string(),
                "Accept".to_string(),
                "I agree".to_string(),
                "OK".to_string(),
            ],
            chromium_path: None,
        }
    }
}

impl ServiceConfig {
    /// Load from a JSON file; missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
