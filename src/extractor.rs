//! The extraction engine: candidate parsing followed by normalization.
//!
//! [`ProductExtractor`] holds only configuration, so one instance can serve
//! any number of pages concurrently.

use scraper::Html;

use crate::config::SiteConfig;
use crate::dom::DomDocument;
use crate::models::ExtractionResult;
use crate::normalizer;
use crate::parser;
use crate::rules::FieldRules;

#[derive(Debug, Clone, Default)]
pub struct ProductExtractor {
    site: SiteConfig,
    rules: FieldRules,
}

impl ProductExtractor {
    pub fn new(site: SiteConfig) -> Self {
        Self { site, rules: FieldRules::default() }
    }

    /// Replace the field fallback chains, for catalogs with their own markup.
    pub fn with_rules(mut self, rules: FieldRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Extract the products listed in a rendered document.
    ///
    /// `requested_url` is only echoed back as the result's `source`.
    pub fn extract_products<D: DomDocument>(&self, document: &D, requested_url: &str) -> ExtractionResult {
        let candidates = parser::parse_candidates(document, &self.site, &self.rules);
        let normalized = normalizer::normalize(&candidates, &self.site);

        ExtractionResult {
            source: requested_url.to_string(),
            count: normalized.products.len(),
            total_found: normalized.total_found,
            extracted_at: chrono::Utc::now().to_rfc3339(),
            products: normalized.products,
        }
    }

    pub fn extract_from_html(&self, html: &str, requested_url: &str) -> ExtractionResult {
        let doc = Html::parse_document(html);
        self.extract_products(&doc, requested_url)
    }
}
