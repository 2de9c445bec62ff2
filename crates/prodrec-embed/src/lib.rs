//! Embedding functions for product text.
//!
//! `HashEmbedder` is deterministic and model-free; `EmbeddingModel` runs
//! BGE-M3 locally. `build_embedder` picks one from configuration and honours
//! `PRODREC_USE_HASH_EMBEDDINGS=1` to force the hashed embedder.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use prodrec_core::config::{EmbeddingProvider, EmbeddingSettings};
use prodrec_core::traits::Embedder;

pub mod hash;
pub mod model;
pub mod pool;

pub use hash::HashEmbedder;
pub use model::EmbeddingModel;
pub use pool::masked_mean_l2;

pub fn build_embedder(settings: &EmbeddingSettings, model_dir: &Path) -> Result<Arc<dyn Embedder>> {
    let force_hash = std::env::var("PRODREC_USE_HASH_EMBEDDINGS").ok().is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    if force_hash || settings.provider == EmbeddingProvider::Hash {
        tracing::info!(dim = settings.dim, "using hash embeddings");
        return Ok(Arc::new(HashEmbedder::new(settings.dim)));
    }
    Ok(Arc::new(EmbeddingModel::load(model_dir, settings.max_len)?))
}
