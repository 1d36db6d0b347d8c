//! Product extraction for e-commerce category pages.
//!
//! Given the rendered HTML of a category page, [`ProductExtractor`] finds
//! every product card, reads its title, price, old price and image through
//! ordered selector fallbacks, then resolves, filters and deduplicates the
//! product links into a capped list of [`Product`]s.

pub mod config;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod models;
pub mod normalizer;
pub mod parser;
pub mod renderer;
pub mod rules;
pub mod server;

pub use config::{ServiceConfig, SiteConfig};
pub use extractor::ProductExtractor;
pub use models::{ExtractionResult, Product, RawCandidate};
