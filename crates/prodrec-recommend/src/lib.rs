//! prodrec-recommend
//!
//! Ties the normalizer, an embedder and a vector store together: `train`
//! embeds the catalogue, `predict` returns similar products excluding the
//! queried one, and `score` measures top-level category agreement.

pub mod recommender;
pub mod score;

pub use recommender::{Recommender, DEFAULT_K};
pub use score::{RowScore, ScoreReport};
