//! CART regression trees: variance-reduction splits found by a
//! sort-and-scan pass over each candidate feature.

use ndarray::ArrayView2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// How many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureSubsample {
    /// Every feature (the regression-forest default).
    All,
    /// A fresh random subset of ceil(sqrt(n_features)) per split.
    Sqrt,
}

/// Growth bounds for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub feature_subsample: FeatureSubsample,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            feature_subsample: FeatureSubsample::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    /// Grows a tree over the given row subset of `x`.
    ///
    /// `rows` indexes into `x`/`y`, so callers can fit on bootstrap
    /// samples or cross-validation folds without copying the matrix.
    ///
    /// # Panics
    /// - if `rows` is empty
    /// - if `y` is shorter than the largest row index
    pub fn fit<R: Rng>(
        x: ArrayView2<'_, f64>,
        y: &[f64],
        rows: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        assert!(!rows.is_empty(), "cannot fit a tree on zero rows");
        Self {
            root: grow(x, y, rows.to_vec(), 0, params, rng),
        }
    }

    /// Predicts one fully numeric feature row, in fitting column order.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn grow<R: Rng>(
    x: ArrayView2<'_, f64>,
    y: &[f64],
    rows: Vec<usize>,
    depth: usize,
    params: &TreeParams,
    rng: &mut R,
) -> Node {
    let n = rows.len();
    let total_sum: f64 = rows.iter().map(|&r| y[r]).sum();
    let mean = total_sum / n as f64;

    let depth_capped = params.max_depth.is_some_and(|d| depth >= d);
    if n < params.min_samples_split || depth_capped || constant_target(y, &rows) {
        return Node::Leaf { value: mean };
    }

    let total_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();
    let features = candidate_features(x.ncols(), params.feature_subsample, rng);

    // (feature, threshold, summed squared error of both sides)
    let mut best: Option<(usize, f64, f64)> = None;
    let mut order: Vec<(f64, f64)> = Vec::with_capacity(n);
    for &feature in &features {
        order.clear();
        order.extend(rows.iter().map(|&r| (x[[r, feature]], y[r])));
        order.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 1..n {
            let (xv, yv) = order[i - 1];
            left_sum += yv;
            left_sq += yv * yv;
            if xv == order[i].0 {
                // no threshold separates equal feature values
                continue;
            }
            let (left_n, right_n) = (i, n - i);
            if left_n < params.min_samples_leaf || right_n < params.min_samples_leaf {
                continue;
            }
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let cost = (left_sq - left_sum * left_sum / left_n as f64)
                + (right_sq - right_sum * right_sum / right_n as f64);
            if best.is_none_or(|(_, _, c)| cost < c) {
                best = Some((feature, (xv + order[i].0) / 2.0, cost));
            }
        }
    }

    let Some((feature, threshold, _)) = best else {
        return Node::Leaf { value: mean };
    };

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
        rows.into_iter().partition(|&r| x[[r, feature]] <= threshold);
    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(x, y, left_rows, depth + 1, params, rng)),
        right: Box::new(grow(x, y, right_rows, depth + 1, params, rng)),
    }
}

fn constant_target(y: &[f64], rows: &[usize]) -> bool {
    let first = y[rows[0]];
    rows.iter().all(|&r| y[r] == first)
}

fn candidate_features<R: Rng>(
    n_features: usize,
    subsample: FeatureSubsample,
    rng: &mut R,
) -> Vec<usize> {
    let mut all: Vec<usize> = (0..n_features).collect();
    match subsample {
        FeatureSubsample::All => all,
        FeatureSubsample::Sqrt => {
            all.shuffle(rng);
            let m = (n_features as f64).sqrt().ceil() as usize;
            all.truncate(m.max(1));
            all
        }
    }
}
