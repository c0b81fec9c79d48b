//! Bootstrap-aggregated regression forest. Trees are fitted in
//! parallel; determinism is preserved by deriving every tree's rng
//! seed from the run seed and the tree index.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{RegressorError, Result};
use crate::tree::{DecisionTree, TreeParams};

/// Forest configuration. The defaults mirror the deployed model:
/// 100 unbounded-depth trees over bootstrap resamples, seed 42.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub tree: TreeParams,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            tree: TreeParams::default(),
            seed: 42,
        }
    }
}

/// A fitted random forest; prediction is the mean over member trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    params: ForestParams,
}

impl RandomForest {
    /// Fits the forest over the given row subset of `x`.
    ///
    /// # Errors
    /// Fails on an empty row set, a zero tree count, or a `y` that does
    /// not cover the matrix rows.
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: &[f64],
        rows: &[usize],
        params: ForestParams,
    ) -> Result<Self> {
        validate(x, y, rows)?;
        if params.n_trees == 0 {
            return Err(RegressorError::InvalidConfig(
                "n_trees must be positive".to_string(),
            ));
        }
        let trees: Vec<DecisionTree> = (0..params.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
                let sample: Vec<usize> = (0..rows.len())
                    .map(|_| rows[rng.random_range(0..rows.len())])
                    .collect();
                DecisionTree::fit(x, y, &sample, &params.tree, &mut rng)
            })
            .collect();
        Ok(Self { trees, params })
    }

    /// Predicts one feature row, in fitting column order.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

pub(crate) fn validate(x: ArrayView2<'_, f64>, y: &[f64], rows: &[usize]) -> Result<()> {
    if rows.is_empty() {
        return Err(RegressorError::EmptyTrainingSet);
    }
    if y.len() != x.nrows() {
        return Err(RegressorError::LengthMismatch {
            what: "target",
            got: y.len(),
            expected: x.nrows(),
        });
    }
    if let Some(&bad) = rows.iter().find(|&&r| r >= x.nrows()) {
        return Err(RegressorError::LengthMismatch {
            what: "row index",
            got: bad,
            expected: x.nrows(),
        });
    }
    Ok(())
}
