use serde::{Deserialize, Serialize};

use prodrec_core::error::{Error, Result};
use prodrec_core::traits::VectorStoreBuilder;
use prodrec_core::types::{PID, PRODUCT_CATEGORY_TREE};
use prodrec_core::Dataset;
use prodrec_text::top_level_category;

use crate::recommender::Recommender;

/// Category agreement for a single evaluated product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowScore {
    pub pid: String,
    pub category: String,
    pub matching: usize,
    pub total: usize,
    pub performance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub rows: Vec<RowScore>,
    pub mean: f64,
}

impl<B: VectorStoreBuilder> Recommender<B> {
    /// Mean fraction of recommended neighbors sharing the product's
    /// top-level category, over every row of `df`.
    pub fn score(&self, df: &Dataset) -> Result<f64> {
        Ok(self.evaluate(df)?.mean)
    }

    /// Per-row breakdown behind `score`.
    ///
    /// `df` is only borrowed; evaluation never writes back into it.
    pub fn evaluate(&self, df: &Dataset) -> Result<ScoreReport> {
        if df.is_empty() {
            return Err(Error::InvalidData("cannot score an empty dataset".to_string()));
        }
        let mut rows = Vec::with_capacity(df.len());
        for row in df.rows() {
            let pid = row.get(PID).ok_or_else(|| Error::MissingColumn(PID.to_string()))?;
            let tree = row
                .get(PRODUCT_CATEGORY_TREE)
                .ok_or_else(|| Error::MissingColumn(PRODUCT_CATEGORY_TREE.to_string()))?;
            rows.push(self.row_score(df, pid, tree)?);
        }
        let mean = rows.iter().map(|r| r.performance).sum::<f64>() / rows.len() as f64;
        tracing::info!(rows = rows.len(), mean, k = self.k(), "evaluated recommender");
        Ok(ScoreReport { rows, mean })
    }

    fn row_score(&self, df: &Dataset, pid: &str, tree: &str) -> Result<RowScore> {
        let category = top_level_category(tree);
        let neighbors = self.predict(df, pid)?;
        let matching = neighbors
            .iter()
            .filter(|n| top_level_category(&n.product_category_tree) == category)
            .count();
        let total = neighbors.len();
        // no neighbors counts as a miss
        let performance = if total == 0 { 0.0 } else { matching as f64 / total as f64 };
        Ok(RowScore { pid: pid.to_string(), category, matching, total, performance })
    }
}
