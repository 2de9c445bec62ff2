use anyhow::Result;
use std::cmp::Ordering;
use std::sync::Arc;

use prodrec_core::traits::{Embedder, MetaFilter, VectorStore, VectorStoreBuilder};
use prodrec_core::types::{DistanceMetric, ItemId, Meta, SearchHit};

use crate::distance::similarity;
use crate::{candidate_pool, check_parallel, embed_with_progress, filter_candidates};

#[derive(Debug, Clone)]
struct StoredItem {
    id: ItemId,
    text: String,
    metadata: Meta,
    vector: Vec<f32>,
}

/// Exact (flat) in-process store. Every search scans all stored vectors.
pub struct MemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    metric: DistanceMetric,
    items: Vec<StoredItem>,
}

impl MemoryVectorStore {
    pub fn metric(&self) -> DistanceMetric { self.metric }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }

    pub fn metadata(&self, id: &str) -> Option<&Meta> {
        self.items.iter().find(|item| item.id == id).map(|item| &item.metadata)
    }
}

impl VectorStore for MemoryVectorStore {
    fn len(&self) -> usize { self.items.len() }

    fn similarity_search(&self, query: &str, k: usize, fetch_k: usize, filter: Option<MetaFilter<'_>>) -> Result<Vec<SearchHit>> {
        let pool = candidate_pool(k, fetch_k, filter);
        if pool == 0 || k == 0 || self.items.is_empty() {
            return Ok(Vec::new());
        }
        let q = self.embedder.embed_query(query)?;
        let mut scored: Vec<(usize, f32)> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (i, similarity(self.metric, &q, &item.vector)))
            .collect();
        // stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let candidates = scored
            .into_iter()
            .take(pool)
            .map(|(i, score)| {
                let item = &self.items[i];
                SearchHit { id: item.id.clone(), text: item.text.clone(), metadata: item.metadata.clone(), score }
            })
            .collect();
        let hits = filter_candidates(candidates, k, filter);
        tracing::debug!(pool, returned = hits.len(), "memory similarity search");
        Ok(hits)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryStoreBuilder {
    pub metric: DistanceMetric,
}

impl MemoryStoreBuilder {
    pub fn new(metric: DistanceMetric) -> Self { Self { metric } }
}

impl VectorStoreBuilder for MemoryStoreBuilder {
    type Store = MemoryVectorStore;

    fn build(&self, texts: &[String], embedder: Arc<dyn Embedder>, metadatas: Vec<Meta>, ids: Vec<ItemId>) -> Result<MemoryVectorStore> {
        check_parallel(texts.len(), metadatas.len(), ids.len())?;
        let vectors = embed_with_progress(embedder.as_ref(), texts)?;
        let items = ids
            .into_iter()
            .zip(texts.iter().cloned())
            .zip(metadatas)
            .zip(vectors)
            .map(|(((id, text), metadata), vector)| StoredItem { id, text, metadata, vector })
            .collect::<Vec<_>>();
        tracing::info!(items = items.len(), metric = ?self.metric, "built in-memory vector store");
        Ok(MemoryVectorStore { embedder, metric: self.metric, items })
    }
}
