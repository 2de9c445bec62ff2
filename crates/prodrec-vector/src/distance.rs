use prodrec_core::types::DistanceMetric;

pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

/// Cosine similarity; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
}

/// Similarity score for ranking: higher is closer.
pub fn similarity(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        DistanceMetric::L2 => 1.0 / (1.0 + l2_distance(a, b)),
        DistanceMetric::Cosine => cosine_similarity(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_similarity_is_one_for_identical_vectors() {
        let v = [0.3, -1.0, 2.0];
        assert!((similarity(DistanceMetric::L2, &v, &v) - 1.0).abs() < 1e-6);
        assert!(similarity(DistanceMetric::L2, &v, &[0.0, 0.0, 0.0]) < 1.0);
    }

    #[test]
    fn cosine_ignores_magnitude() {
        let s = similarity(DistanceMetric::Cosine, &[1.0, 1.0], &[3.0, 3.0]);
        assert!((s - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
