use std::path::Path;

use prodrec_core::config::{EmbeddingProvider, EmbeddingSettings};
use prodrec_core::traits::Embedder;
use prodrec_embed::{build_embedder, HashEmbedder};

fn dot(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }

#[test]
fn hash_embedder_shapes_and_determinism() {
    let embedder = HashEmbedder::new(256);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 256, "embedding dim is 256");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn shared_tokens_are_closer_than_disjoint_ones() {
    let embedder = HashEmbedder::new(512);
    let q = embedder.embed_query("leather wallet brown").unwrap();
    let near = embedder.embed_query("leather wallet black").unwrap();
    let far = embedder.embed_query("garden hose nozzle").unwrap();
    assert!(dot(&q, &near) > dot(&q, &far));
}

#[test]
fn empty_text_embeds_to_zero_vector() {
    let v = HashEmbedder::new(8).embed_text("");
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn hash_provider_needs_no_model_dir() {
    let settings = EmbeddingSettings { provider: EmbeddingProvider::Hash, dim: 32, ..EmbeddingSettings::default() };
    let embedder = build_embedder(&settings, Path::new("/nonexistent")).expect("embedder");
    assert_eq!(embedder.dim(), 32);
}

#[test]
fn model_provider_reports_missing_weights() {
    if std::env::var("PRODREC_USE_HASH_EMBEDDINGS").is_ok() { return; }
    let settings = EmbeddingSettings { provider: EmbeddingProvider::Model, ..EmbeddingSettings::default() };
    assert!(build_embedder(&settings, Path::new("/nonexistent/bge-m3")).is_err());
}
