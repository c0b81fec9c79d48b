//! Ensemble regression for the grade prediction pipeline: CART trees,
//! a seeded random forest, squared-loss gradient boosting, the
//! deterministic train/test split, held-out metrics, grid search, and
//! the persisted fitted-model artifact.

pub mod boost;
pub mod error;
pub mod forest;
pub mod metrics;
pub mod model;
pub mod search;
pub mod split;
pub mod tree;

pub use boost::{BoostParams, GradientBoost};
pub use error::{RegressorError, Result};
pub use forest::{ForestParams, RandomForest};
pub use model::{FittedModel, Regressor};
pub use search::{Candidate, FamilyConfig, SearchGrid, SearchOutcome};
pub use tree::{DecisionTree, FeatureSubsample, TreeParams};
