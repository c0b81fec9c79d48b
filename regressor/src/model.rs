//! The persisted model artifact: a fitted regressor bound to the exact
//! feature column order of its training input.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::boost::GradientBoost;
use crate::error::{RegressorError, Result};
use crate::forest::RandomForest;

/// Either supported ensemble family, behind one predict surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Regressor {
    Forest(RandomForest),
    Boost(GradientBoost),
}

impl Regressor {
    /// Predicts one feature row, in fitting column order.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        match self {
            Regressor::Forest(m) => m.predict_row(row),
            Regressor::Boost(m) => m.predict_row(row),
        }
    }
}

/// A fitted regressor plus the column order it was trained on.
/// Immutable once created; the predict path reorders by name and
/// fails fast on any column-set mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    columns: Vec<String>,
    regressor: Regressor,
}

impl FittedModel {
    pub fn new(columns: Vec<String>, regressor: Regressor) -> Self {
        Self { columns, regressor }
    }

    /// The feature column order captured at fit time.
    pub fn feature_names(&self) -> &[String] {
        &self.columns
    }

    pub fn regressor(&self) -> &Regressor {
        &self.regressor
    }

    /// Predicts one record given as a name → value map. The vector is
    /// assembled in fitted column order, so the caller's field order is
    /// irrelevant.
    ///
    /// # Errors
    /// `ColumnContract` if the record and the fitted column set differ
    /// in either direction.
    pub fn predict(&self, record: &HashMap<String, f64>) -> Result<f64> {
        let mut row = Vec::with_capacity(self.columns.len());
        let mut missing = Vec::new();
        for column in &self.columns {
            match record.get(column) {
                Some(v) => row.push(*v),
                None => missing.push(column.clone()),
            }
        }
        let mut unexpected: Vec<String> = record
            .keys()
            .filter(|k| !self.columns.contains(*k))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            unexpected.sort_unstable();
            return Err(RegressorError::ColumnContract {
                missing,
                unexpected,
            });
        }
        Ok(self.regressor.predict_row(&row))
    }

    /// Maps each fitted column to its position within `names`, for
    /// batch callers that hold a whole matrix in `names` order.
    ///
    /// # Errors
    /// `ColumnContract` if the sets differ in either direction.
    pub fn permutation(&self, names: &[String]) -> Result<Vec<usize>> {
        let mut order = Vec::with_capacity(self.columns.len());
        let mut missing = Vec::new();
        for column in &self.columns {
            match names.iter().position(|n| n == column) {
                Some(i) => order.push(i),
                None => missing.push(column.clone()),
            }
        }
        let unexpected: Vec<String> = names
            .iter()
            .filter(|n| !self.columns.contains(*n))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(RegressorError::ColumnContract {
                missing,
                unexpected,
            });
        }
        Ok(order)
    }

    /// Persists the artifact as one JSON blob.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json).map_err(|e| RegressorError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Loads a previously saved artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RegressorError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::forest::ForestParams;

    fn fitted() -> FittedModel {
        let x = Array2::from_shape_vec(
            (4, 2),
            vec![
                0.0, 10.0, //
                1.0, 20.0, //
                2.0, 30.0, //
                3.0, 40.0,
            ],
        )
        .unwrap();
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let rows = vec![0, 1, 2, 3];
        let forest = RandomForest::fit(
            x.view(),
            &y,
            &rows,
            ForestParams {
                n_trees: 8,
                ..ForestParams::default()
            },
        )
        .unwrap();
        FittedModel::new(vec!["a".into(), "b".into()], Regressor::Forest(forest))
    }

    #[test]
    fn predicts_from_a_map_regardless_of_caller_order() {
        let model = fitted();
        let mut record = HashMap::new();
        record.insert("b".to_string(), 20.0);
        record.insert("a".to_string(), 1.0);
        let score = model.predict(&record).unwrap();
        assert!(score.is_finite());
    }

    #[test]
    fn missing_and_unexpected_columns_fail_fast() {
        let model = fitted();
        let mut record = HashMap::new();
        record.insert("a".to_string(), 1.0);
        record.insert("c".to_string(), 9.0);
        let err = model.predict(&record).unwrap_err();
        match err {
            RegressorError::ColumnContract {
                missing,
                unexpected,
            } => {
                assert_eq!(missing, ["b"]);
                assert_eq!(unexpected, ["c"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn permutation_reorders_by_name() {
        let model = fitted();
        let names = vec!["b".to_string(), "a".to_string()];
        assert_eq!(model.permutation(&names).unwrap(), vec![1, 0]);
        assert!(model.permutation(&["a".to_string()]).is_err());
    }

    #[test]
    fn save_load_round_trip() {
        let model = fitted();
        let path = std::env::temp_dir().join(format!(
            "regressor-model-{}.json",
            std::process::id()
        ));
        model.save(&path).unwrap();
        let loaded = FittedModel::load(&path).unwrap();
        assert_eq!(model, loaded);
        std::fs::remove_file(path).ok();
    }
}
