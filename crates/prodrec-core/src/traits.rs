use std::sync::Arc;

use crate::types::{ItemId, Meta, SearchHit};

/// Inclusion predicate over a candidate's metadata.
pub type MetaFilter<'a> = &'a dyn Fn(&Meta) -> bool;

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector for query"))
    }
}

pub trait VectorStore: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nearest stored items to `query`, best first.
    ///
    /// With a filter, the `fetch_k` nearest candidates are retrieved, those
    /// failing the predicate are dropped and at most `k` survive. Without a
    /// filter only `k` candidates are retrieved.
    fn similarity_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
        filter: Option<MetaFilter<'_>>,
    ) -> anyhow::Result<Vec<SearchHit>>;
}

pub trait VectorStoreBuilder {
    type Store: VectorStore;

    /// Build a fresh store. `texts`, `metadatas` and `ids` are parallel.
    fn build(
        &self,
        texts: &[String],
        embedder: Arc<dyn Embedder>,
        metadatas: Vec<Meta>,
        ids: Vec<ItemId>,
    ) -> anyhow::Result<Self::Store>;
}
