use std::sync::Arc;

use prodrec_core::traits::{Embedder, VectorStore, VectorStoreBuilder};
use prodrec_core::types::{DistanceMetric, Meta};
use prodrec_embed::HashEmbedder;
use prodrec_vector::{LanceStoreBuilder, LanceVectorStore};
use tempfile::TempDir;

fn catalogue() -> (Vec<String>, Vec<Meta>, Vec<String>) {
    let texts: Vec<String> = [
        "red cotton shirt",
        "blue cotton shirt",
        "stainless steel kettle",
        "electric steel kettle",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let metas = (0..texts.len()).map(|i| [("pid".to_string(), format!("p{i}"))].into_iter().collect()).collect();
    let ids = (0..texts.len()).map(|i| format!("id-{i}")).collect();
    (texts, metas, ids)
}

#[test]
fn lancedb_build_search_and_reopen() {
    let tmp = TempDir::new().expect("tmp");
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(64));
    let (texts, metas, ids) = catalogue();
    let builder = LanceStoreBuilder::new(tmp.path().join("lancedb"), "products_test", DistanceMetric::L2);

    let store = builder.build(&texts, embedder.clone(), metas, ids).expect("build");
    assert_eq!(store.len(), 4);
    let hits = store.similarity_search("red cotton shirt", 2, 2, None).expect("search");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].metadata["pid"], "p0");
    assert_eq!(hits[0].id, "id-0");
    assert!(hits[0].score >= hits[1].score);

    let skip_p0 = |m: &Meta| m.get("pid").is_none_or(|p| p != "p0");
    let hits = store.similarity_search("red cotton shirt", 2, 4, Some(&skip_p0)).expect("filtered search");
    assert!(hits.iter().all(|h| h.metadata["pid"] != "p0"));
    assert_eq!(hits.len(), 2);
    drop(store);

    let reopened = LanceVectorStore::open(&tmp.path().join("lancedb"), "products_test", embedder, DistanceMetric::L2).expect("open");
    assert_eq!(reopened.len(), 4);
    let hits = reopened.similarity_search("steel kettle", 1, 1, None).expect("search");
    assert!(hits[0].text.contains("kettle"));
}

#[test]
fn lancedb_rebuild_replaces_table() {
    let tmp = TempDir::new().expect("tmp");
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32));
    let builder = LanceStoreBuilder::new(tmp.path().to_path_buf(), "products", DistanceMetric::Cosine);
    let (texts, metas, ids) = catalogue();
    builder.build(&texts, embedder.clone(), metas, ids).expect("first build");

    let meta: Meta = [("pid".to_string(), "only".to_string())].into_iter().collect();
    let store = builder.build(&["lonely lamp".to_string()], embedder, vec![meta], vec!["x".to_string()]).expect("rebuild");
    assert_eq!(store.len(), 1);
    let hits = store.similarity_search("lamp", 5, 5, None).expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].metadata["pid"], "only");
}

#[test]
fn opening_a_missing_table_fails() {
    let tmp = TempDir::new().expect("tmp");
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(8));
    assert!(LanceVectorStore::open(tmp.path(), "absent", embedder, DistanceMetric::L2).is_err());
}
