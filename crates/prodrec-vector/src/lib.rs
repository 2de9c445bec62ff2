//! Vector stores for product embeddings.
//!
//! Both backends follow the same search contract: rank every stored item by
//! similarity to the embedded query, keep the `fetch_k` best when a metadata
//! predicate is supplied (`k` otherwise), drop candidates the predicate
//! rejects, and return at most `k` hits best first.

use anyhow::{Result, ensure};
use indicatif::{ProgressBar, ProgressStyle};

use prodrec_core::traits::{Embedder, MetaFilter};
use prodrec_core::types::SearchHit;

pub mod distance;
pub mod lance;
pub mod memory;
pub mod schema;

pub use lance::{LanceStoreBuilder, LanceVectorStore};
pub use memory::{MemoryStoreBuilder, MemoryVectorStore};

const EMBED_BATCH: usize = 256;

/// Embed `texts` in batches, reporting progress on stderr.
pub fn embed_with_progress(embedder: &dyn Embedder, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let pb = ProgressBar::new(texts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} products ({percent}%)")?
            .progress_chars("#>-"),
    );
    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(EMBED_BATCH) {
        let embedded = embedder.embed_batch(batch)?;
        ensure!(embedded.len() == batch.len(), "embedder returned {} vectors for {} texts", embedded.len(), batch.len());
        vectors.extend(embedded);
        pb.inc(batch.len() as u64);
    }
    pb.finish_and_clear();
    Ok(vectors)
}

/// Size of the candidate pool retrieved before filtering.
pub(crate) fn candidate_pool(k: usize, fetch_k: usize, filter: Option<MetaFilter<'_>>) -> usize {
    if filter.is_some() { fetch_k } else { k }
}

/// Apply the predicate to best-first candidates and keep at most `k`.
pub(crate) fn filter_candidates(candidates: Vec<SearchHit>, k: usize, filter: Option<MetaFilter<'_>>) -> Vec<SearchHit> {
    candidates
        .into_iter()
        .filter(|hit| filter.is_none_or(|keep| keep(&hit.metadata)))
        .take(k)
        .collect()
}

pub(crate) fn check_parallel(texts: usize, metadatas: usize, ids: usize) -> Result<()> {
    ensure!(
        texts == metadatas && texts == ids,
        "texts ({texts}), metadatas ({metadatas}) and ids ({ids}) must have the same length"
    );
    Ok(())
}
