//! Domain types shared by the normalizer, the stores and the recommender.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Store-internal identifier of a stored item. Distinct from the product `pid`.
pub type ItemId = String;

/// One metadata record: column name to cell value.
pub type Meta = HashMap<String, String>;

pub const PID: &str = "pid";
pub const COMBINED_TEXT: &str = "combined_text";
pub const PRODUCT_NAME: &str = "product_name";
pub const PRODUCT_CATEGORY_TREE: &str = "product_category_tree";
pub const DISCOUNTED_PRICE: &str = "discounted_price";
pub const BRAND: &str = "brand";

/// Substituted for any neighbor field missing from its metadata.
pub const UNKNOWN: &str = "Unknown";

/// A single similarity-search result.
///
/// `score` is backend-specific but higher is always better. Results are
/// returned best first and callers must keep that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ItemId,
    pub text: String,
    pub metadata: Meta,
    pub score: f32,
}

/// One recommended product as surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub pid: String,
    pub product_name: String,
    pub product_category_tree: String,
    pub discounted_price: String,
    pub brand: String,
}

impl Recommendation {
    pub fn from_metadata(metadata: &Meta) -> Self {
        let field = |name: &str| metadata.get(name).cloned().unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            pid: field(PID),
            product_name: field(PRODUCT_NAME),
            product_category_tree: field(PRODUCT_CATEGORY_TREE),
            discounted_price: field(DISCOUNTED_PRICE),
            brand: field(BRAND),
        }
    }
}

/// Distance used to rank stored vectors against a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance, the flat-index default.
    #[default]
    L2,
    Cosine,
}
