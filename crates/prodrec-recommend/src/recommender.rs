use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use prodrec_core::error::{Error, Result};
use prodrec_core::traits::{Embedder, VectorStore, VectorStoreBuilder};
use prodrec_core::types::{ItemId, Meta, Recommendation, COMBINED_TEXT, PID};
use prodrec_core::Dataset;
use prodrec_text::TextNormalizer;

pub const DEFAULT_K: usize = 10;

/// Content-based product recommender.
///
/// Owns the embedding function, the training dataset with its parallel
/// metadata records, and the vector store built from them. The store is
/// absent until `train` runs or one is injected with `set_vectorstore`.
pub struct Recommender<B: VectorStoreBuilder> {
    embedder: Arc<dyn Embedder>,
    builder: B,
    normalizer: TextNormalizer,
    data: Dataset,
    metadatas: Vec<Meta>,
    k: usize,
    vectorstore: Option<B::Store>,
}

impl<B: VectorStoreBuilder> Recommender<B> {
    pub fn new(data: Dataset, metadatas: Vec<Meta>, embedder: Arc<dyn Embedder>, builder: B) -> Result<Self> {
        let normalizer = TextNormalizer::new()?;
        Ok(Self { embedder, builder, normalizer, data, metadatas, k: DEFAULT_K, vectorstore: None })
    }

    pub fn fit(&mut self) -> Result<()> {
        self.train()
    }

    /// Rebuild the vector store from the full `combined_text` column.
    ///
    /// Every row gets a fresh store-internal id. The store receives its own
    /// copy of the metadata records, so later `set_data` calls never reach it.
    pub fn train(&mut self) -> Result<()> {
        let texts = self.data.texts(COMBINED_TEXT)?;
        if self.metadatas.len() != texts.len() {
            return Err(Error::InvalidData(format!(
                "{} metadata records for {} dataset rows",
                self.metadatas.len(),
                texts.len()
            )));
        }
        let ids: Vec<ItemId> = texts.iter().map(|_| Uuid::new_v4().to_string()).collect();
        tracing::info!(rows = texts.len(), "training vector store");
        let store = self.builder.build(&texts, Arc::clone(&self.embedder), self.metadatas.clone(), ids)?;
        self.vectorstore = Some(store);
        Ok(())
    }

    /// Up to `k` products similar to the product `id` of `df`, best first.
    ///
    /// The queried product itself is never part of the result.
    pub fn predict(&self, df: &Dataset, id: &str) -> Result<Vec<Recommendation>> {
        if !df.has_column(COMBINED_TEXT) {
            return Err(Error::MissingColumn(COMBINED_TEXT.to_string()));
        }
        let row = df.find_by_pid(id).ok_or_else(|| Error::NotFound(format!("pid '{id}'")))?;
        let target_text_full = row.get(COMBINED_TEXT).map(String::as_str).unwrap_or_default();
        let target_text: String = self.normalizer.normalize(target_text_full);

        let store = self.vectorstore.as_ref().ok_or(Error::NotTrained)?;

        let mut seen_pids: HashSet<String> = HashSet::from([id.to_string()]);
        let exclude_seen = |metadata: &Meta| metadata.get(PID).is_none_or(|pid| !seen_pids.contains(pid));
        let similar = store.similarity_search(&target_text, self.k, self.k, Some(&exclude_seen))?;

        let mut recommendations = Vec::with_capacity(similar.len());
        for hit in similar {
            if let Some(pid) = hit.metadata.get(PID) {
                seen_pids.insert(pid.clone());
            }
            recommendations.push(Recommendation::from_metadata(&hit.metadata));
        }
        tracing::debug!(pid = id, returned = recommendations.len(), k = self.k, "predicted neighbors");
        Ok(recommendations)
    }

    pub fn k(&self) -> usize { self.k }

    pub fn set_k(&mut self, value: usize) -> usize {
        self.k = value;
        self.k
    }

    pub fn vectorstore(&self) -> Option<&B::Store> { self.vectorstore.as_ref() }

    pub fn set_vectorstore(&mut self, store: B::Store) -> &B::Store {
        tracing::info!(items = store.len(), "vector store replaced");
        self.vectorstore.insert(store)
    }

    pub fn data(&self) -> &Dataset { &self.data }

    /// Replace the training inputs. The current store is left as is.
    pub fn set_data(&mut self, data: Dataset, metadatas: Vec<Meta>) {
        self.data = data;
        self.metadatas = metadatas;
    }
}
