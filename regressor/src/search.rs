//! Grid search over model family, tree count, and depth, selected by
//! k-fold cross-validated mean absolute error.

use log::{debug, info};
use ndarray::ArrayView2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::boost::{BoostParams, GradientBoost};
use crate::error::{RegressorError, Result};
use crate::forest::{ForestParams, RandomForest, validate};
use crate::model::Regressor;
use crate::tree::TreeParams;

/// The model families the search considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyConfig {
    Forest,
    GradientBoost,
}

/// One fully specified configuration from the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub family: FamilyConfig,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
}

impl Candidate {
    /// Fits this configuration over the given row subset.
    pub fn fit(
        &self,
        x: ArrayView2<'_, f64>,
        y: &[f64],
        rows: &[usize],
        seed: u64,
    ) -> Result<Regressor> {
        match self.family {
            FamilyConfig::Forest => {
                let params = ForestParams {
                    n_trees: self.n_trees,
                    tree: TreeParams {
                        max_depth: self.max_depth,
                        ..TreeParams::default()
                    },
                    seed,
                };
                Ok(Regressor::Forest(RandomForest::fit(x, y, rows, params)?))
            }
            FamilyConfig::GradientBoost => {
                let max_depth = self.max_depth.ok_or_else(|| {
                    RegressorError::InvalidConfig(
                        "gradient boosting requires a depth bound".to_string(),
                    )
                })?;
                let params = BoostParams {
                    n_trees: self.n_trees,
                    max_depth,
                    seed,
                    ..BoostParams::default()
                };
                Ok(Regressor::Boost(GradientBoost::fit(x, y, rows, params)?))
            }
        }
    }
}

/// The discrete search space plus the cross-validation setup.
#[derive(Debug, Clone)]
pub struct SearchGrid {
    pub families: Vec<FamilyConfig>,
    pub n_trees: Vec<usize>,
    pub max_depths: Vec<Option<usize>>,
    pub folds: usize,
    pub seed: u64,
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self {
            families: vec![FamilyConfig::Forest, FamilyConfig::GradientBoost],
            n_trees: vec![50, 100],
            max_depths: vec![None, Some(6), Some(3)],
            folds: 3,
            seed: 42,
        }
    }
}

impl SearchGrid {
    /// All valid configurations, in deterministic grid order. Unbounded
    /// depth is a forest-only option.
    pub fn candidates(&self) -> Vec<Candidate> {
        let mut out = Vec::new();
        for &family in &self.families {
            for &n_trees in &self.n_trees {
                for &max_depth in &self.max_depths {
                    if family == FamilyConfig::GradientBoost && max_depth.is_none() {
                        continue;
                    }
                    out.push(Candidate {
                        family,
                        n_trees,
                        max_depth,
                    });
                }
            }
        }
        out
    }
}

/// The winning configuration and its cross-validated score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub candidate: Candidate,
    pub cv_mae: f64,
}

/// Scores every grid candidate by k-fold cross-validated MAE over the
/// given row subset and returns the best. Ties keep the earlier grid
/// entry, so the outcome is deterministic.
///
/// # Errors
/// Fails on an empty grid or a row set too small for the fold count.
pub fn grid_search(
    x: ArrayView2<'_, f64>,
    y: &[f64],
    rows: &[usize],
    grid: &SearchGrid,
) -> Result<SearchOutcome> {
    validate(x, y, rows)?;
    if grid.folds < 2 {
        return Err(RegressorError::InvalidConfig(
            "cross-validation needs at least 2 folds".to_string(),
        ));
    }
    if rows.len() < grid.folds * 2 {
        return Err(RegressorError::InvalidConfig(format!(
            "{} rows cannot support {} folds",
            rows.len(),
            grid.folds
        )));
    }
    let candidates = grid.candidates();
    if candidates.is_empty() {
        return Err(RegressorError::InvalidConfig(
            "the search grid is empty".to_string(),
        ));
    }

    let mut shuffled = rows.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(grid.seed));
    let fold_len = shuffled.len().div_ceil(grid.folds);
    let folds: Vec<&[usize]> = shuffled.chunks(fold_len).collect();

    let mut best: Option<SearchOutcome> = None;
    for candidate in candidates {
        let mut fold_maes = Vec::with_capacity(folds.len());
        for (k, fold) in folds.iter().enumerate() {
            let train: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != k)
                .flat_map(|(_, f)| f.iter().copied())
                .collect();
            let model = candidate.fit(x, y, &train, grid.seed)?;
            let mae = fold
                .iter()
                .map(|&r| {
                    let row = x.row(r);
                    let row = row.as_slice().expect("row-major matrix");
                    (model.predict_row(row) - y[r]).abs()
                })
                .sum::<f64>()
                / fold.len() as f64;
            fold_maes.push(mae);
        }
        let cv_mae = fold_maes.iter().sum::<f64>() / fold_maes.len() as f64;
        debug!("candidate {candidate:?}: cv mae {cv_mae:.4}");
        if best.is_none_or(|b| cv_mae < b.cv_mae) {
            best = Some(SearchOutcome { candidate, cv_mae });
        }
    }

    let outcome = best.expect("at least one candidate was scored");
    info!(
        "grid search winner: {:?} (cv mae {:.4})",
        outcome.candidate, outcome.cv_mae
    );
    Ok(outcome)
}
