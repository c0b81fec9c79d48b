//! Squared-loss gradient boosting over the same CART learner: each
//! stage fits the residual left by the running ensemble.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{RegressorError, Result};
use crate::forest::validate;
use crate::tree::{DecisionTree, FeatureSubsample, TreeParams};

/// Boosting configuration: shallow trees, shrinkage 0.1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostParams {
    pub n_trees: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            learning_rate: 0.1,
            max_depth: 3,
            seed: 42,
        }
    }
}

/// A fitted boosted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoost {
    base: f64,
    learning_rate: f64,
    trees: Vec<DecisionTree>,
}

impl GradientBoost {
    /// Fits the ensemble over the given row subset of `x`. Stages are
    /// inherently sequential; each one sees the residual of its
    /// predecessors.
    ///
    /// # Errors
    /// Fails on an empty row set or an invalid configuration.
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: &[f64],
        rows: &[usize],
        params: BoostParams,
    ) -> Result<Self> {
        validate(x, y, rows)?;
        if params.n_trees == 0 {
            return Err(RegressorError::InvalidConfig(
                "n_trees must be positive".to_string(),
            ));
        }
        if !(params.learning_rate > 0.0 && params.learning_rate <= 1.0) {
            return Err(RegressorError::InvalidConfig(format!(
                "learning_rate {} outside (0, 1]",
                params.learning_rate
            )));
        }

        let base = rows.iter().map(|&r| y[r]).sum::<f64>() / rows.len() as f64;
        let tree_params = TreeParams {
            max_depth: Some(params.max_depth),
            feature_subsample: FeatureSubsample::All,
            ..TreeParams::default()
        };

        // residual is full-length so trees can index it by global row
        let mut residual: Vec<f64> = y.iter().map(|v| v - base).collect();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let tree = DecisionTree::fit(x, &residual, rows, &tree_params, &mut rng);
            for &r in rows {
                let row = x.row(r);
                residual[r] -=
                    params.learning_rate * tree.predict_row(row.as_slice().expect("row-major"));
            }
            trees.push(tree);
        }

        Ok(Self {
            base,
            learning_rate: params.learning_rate,
            trees,
        })
    }

    /// Predicts one feature row, in fitting column order.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.base
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|t| t.predict_row(row))
                    .sum::<f64>()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;

    #[test]
    fn drives_training_residuals_down() {
        let n = 30;
        let mut cells = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            cells.push(i as f64);
            y.push(if i < 15 { 5.0 } else { 12.0 });
        }
        let x = Array2::from_shape_vec((n, 1), cells).unwrap();
        let rows: Vec<usize> = (0..n).collect();
        let model = GradientBoost::fit(x.view(), &y, &rows, BoostParams::default()).unwrap();
        for (i, &target) in y.iter().enumerate() {
            assert!((model.predict_row(&[i as f64]) - target).abs() < 0.5);
        }
    }

    #[test]
    fn same_seed_same_ensemble() {
        let x = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let rows = vec![0, 1, 2, 3];
        let params = BoostParams {
            n_trees: 10,
            ..BoostParams::default()
        };
        let a = GradientBoost::fit(x.view(), &y, &rows, params).unwrap();
        let b = GradientBoost::fit(x.view(), &y, &rows, params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_a_zero_learning_rate() {
        let x = Array2::from_shape_vec((2, 1), vec![0.0, 1.0]).unwrap();
        let y = vec![1.0, 2.0];
        let params = BoostParams {
            learning_rate: 0.0,
            ..BoostParams::default()
        };
        assert!(matches!(
            GradientBoost::fit(x.view(), &y, &[0, 1], params),
            Err(RegressorError::InvalidConfig(_))
        ));
    }
}
