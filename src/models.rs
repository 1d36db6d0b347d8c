use serde::{Serialize, Deserialize};

/// A product card as found on the page, before any URL resolution or filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidate {
    pub title: String,
    pub price: Option<String>,
    pub old_price: Option<String>,
    pub image_url: Option<String>,
    /// Raw `href` of the product link, possibly relative.
    pub source_url: String,
}

/// A normalized product. `source_url` and `image_url` are absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub title: String,
    pub price: Option<String>,
    pub old_price: Option<String>,
    /// Listing pages carry no stock signal; always null on the wire.
    pub stock: Option<String>,
    pub image_url: Option<String>,
    pub source_url: String,
}

/// Response envelope for one extraction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// The requested category URL, echoed back.
    pub source: String,
    /// Number of products returned, after the result cap.
    pub count: usize,
    /// Number of unique products found, before the result cap.
    pub total_found: usize,
    pub extracted_at: String,
    pub products: Vec<Product>,
}
