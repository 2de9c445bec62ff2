//! LanceDB-backed persistent store.
//!
//! The table lives at `<db_path>/<table>.lance`. Building a store replaces that
//! table; `LanceVectorStore::open` reattaches to a previously built one so a
//! precomputed store can be injected without re-embedding the catalogue.

use anyhow::{Context, Result, anyhow};
use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, DistanceType, Table};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

use prodrec_core::traits::{Embedder, MetaFilter, VectorStore, VectorStoreBuilder};
use prodrec_core::types::{DistanceMetric, ItemId, Meta, SearchHit};

use crate::schema::build_arrow_schema;
use crate::{candidate_pool, check_parallel, embed_with_progress, filter_candidates};

const INSERT_BATCH: usize = 1000;

pub struct LanceVectorStore {
	runtime: Runtime,
	table: Table,
	embedder: Arc<dyn Embedder>,
	metric: DistanceMetric,
	len: usize,
}

impl LanceVectorStore {
	pub fn open(db_path: &Path, table_name: &str, embedder: Arc<dyn Embedder>, metric: DistanceMetric) -> Result<Self> {
		let runtime = Runtime::new()?;
		let (table, len) = runtime.block_on(async {
			let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
			let table = db.open_table(table_name).execute().await
				.with_context(|| format!("no table '{}' under {}", table_name, db_path.display()))?;
			let len = table.count_rows(None).await?;
			Ok::<_, anyhow::Error>((table, len))
		})?;
		tracing::info!(table = table_name, rows = len, "opened LanceDB vector store");
		Ok(Self { runtime, table, embedder, metric, len })
	}

	fn distance_type(&self) -> DistanceType {
		match self.metric {
			DistanceMetric::L2 => DistanceType::L2,
			DistanceMetric::Cosine => DistanceType::Cosine,
		}
	}

	fn score_from_distance(&self, distance: f32) -> f32 {
		match self.metric {
			DistanceMetric::L2 => 1.0 / (1.0 + distance.max(0.0).sqrt()),
			DistanceMetric::Cosine => 1.0 - distance,
		}
	}

	fn hits_from_batch(&self, batch: &RecordBatch) -> Result<Vec<SearchHit>> {
		let ids = string_column(batch, "id")?;
		let texts = string_column(batch, "text")?;
		let metas = string_column(batch, "metadata")?;
		let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>());
		let mut hits = Vec::with_capacity(batch.num_rows());
		for i in 0..batch.num_rows() {
			let metadata: Meta = serde_json::from_str(metas.value(i))?;
			let score = distances.map_or(0.0, |d| if d.is_valid(i) { self.score_from_distance(d.value(i)) } else { 0.0 });
			hits.push(SearchHit { id: ids.value(i).to_string(), text: texts.value(i).to_string(), metadata, score });
		}
		Ok(hits)
	}
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<StringArray>())
		.ok_or_else(|| anyhow!("{} column missing from search results", name))
}

impl VectorStore for LanceVectorStore {
	fn len(&self) -> usize { self.len }

	fn similarity_search(&self, query: &str, k: usize, fetch_k: usize, filter: Option<MetaFilter<'_>>) -> Result<Vec<SearchHit>> {
		let pool = candidate_pool(k, fetch_k, filter);
		if pool == 0 || k == 0 || self.len == 0 {
			return Ok(Vec::new());
		}
		let q = self.embedder.embed_query(query)?;
		let batches: Vec<RecordBatch> = self.runtime.block_on(async {
			let stream = self.table.vector_search(q)?.distance_type(self.distance_type()).limit(pool).execute().await?;
			Ok::<_, anyhow::Error>(stream.try_collect::<Vec<RecordBatch>>().await?)
		})?;
		let mut candidates = Vec::new();
		for batch in &batches { candidates.extend(self.hits_from_batch(batch)?); }
		let hits = filter_candidates(candidates, k, filter);
		tracing::debug!(pool, returned = hits.len(), "lance similarity search");
		Ok(hits)
	}
}

pub struct LanceStoreBuilder {
	pub db_path: PathBuf,
	pub table_name: String,
	pub metric: DistanceMetric,
}

impl LanceStoreBuilder {
	pub fn new(db_path: PathBuf, table_name: &str, metric: DistanceMetric) -> Self {
		Self { db_path, table_name: table_name.to_string(), metric }
	}

	fn to_record_batch(&self, dim: i32, ids: &[ItemId], texts: &[String], metadatas: &[Meta], vectors: &[Vec<f32>]) -> Result<RecordBatch> {
		let metadata_json = metadatas.iter().map(serde_json::to_string).collect::<Result<Vec<_>, _>>()?;
		let vectors: Vec<Option<Vec<Option<f32>>>> = vectors.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect())).collect();
		let record_batch = RecordBatch::try_new(build_arrow_schema(dim), vec![
			Arc::new(StringArray::from(ids.to_vec())),
			Arc::new(StringArray::from(texts.to_vec())),
			Arc::new(StringArray::from(metadata_json)),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim)),
		])?;
		Ok(record_batch)
	}
}

impl VectorStoreBuilder for LanceStoreBuilder {
	type Store = LanceVectorStore;

	fn build(&self, texts: &[String], embedder: Arc<dyn Embedder>, metadatas: Vec<Meta>, ids: Vec<ItemId>) -> Result<LanceVectorStore> {
		check_parallel(texts.len(), metadatas.len(), ids.len())?;
		let dim = i32::try_from(embedder.dim())?;
		let vectors = embed_with_progress(embedder.as_ref(), texts)?;
		if let Some(bad) = vectors.iter().find(|v| v.len() != embedder.dim()) {
			return Err(anyhow!("embedder returned a {}-dim vector, expected {}", bad.len(), dim));
		}

		// full rebuild: drop whatever the previous build left behind
		std::fs::create_dir_all(&self.db_path)?;
		let table_dir = self.db_path.join(format!("{}.lance", self.table_name));
		if table_dir.exists() { std::fs::remove_dir_all(&table_dir)?; }

		let mut batches = Vec::new();
		for start in (0..texts.len()).step_by(INSERT_BATCH) {
			let end = (start + INSERT_BATCH).min(texts.len());
			batches.push(self.to_record_batch(dim, &ids[start..end], &texts[start..end], &metadatas[start..end], &vectors[start..end])?);
		}
		let schema = build_arrow_schema(dim);
		let reader = Box::new(RecordBatchIterator::new(batches.into_iter().map(Ok), schema));

		let runtime = Runtime::new()?;
		let table = runtime.block_on(async {
			let db = connect(self.db_path.to_string_lossy().as_ref()).execute().await?;
			Ok::<_, anyhow::Error>(db.create_table(&self.table_name, reader).execute().await?)
		})?;
		tracing::info!(table = %self.table_name, rows = texts.len(), path = %self.db_path.display(), "built LanceDB vector store");
		Ok(LanceVectorStore { runtime, table, embedder, metric: self.metric, len: texts.len() })
	}
}
