//! prodrec-text
//!
//! Canonicalization of product descriptions before they are embedded or used as
//! a query, and parsing of `>>`-delimited category paths.

pub mod category;
pub mod normalize;
pub mod stopwords;

pub use category::{extract_category, top_level_category};
pub use normalize::TextNormalizer;
