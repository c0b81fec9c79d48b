//! Process-wide immutable serving state: both artifacts are loaded
//! once at startup, checked against each other, and shared by
//! reference for the life of the process.

use std::path::Path;

use anyhow::{Context, bail};
use log::info;
use regressor::FittedModel;
use tabular::EncoderTable;

pub struct Artifacts {
    pub model: FittedModel,
    pub encoders: EncoderTable,
}

impl Artifacts {
    /// Loads both artifacts from disk. Any failure here is fatal to
    /// startup; requests never observe a half-loaded state.
    pub fn load(model_path: &Path, encoders_path: &Path) -> anyhow::Result<Self> {
        let model = FittedModel::load(model_path)
            .with_context(|| format!("loading model from '{}'", model_path.display()))?;
        let encoders = EncoderTable::load(encoders_path)
            .with_context(|| format!("loading encoders from '{}'", encoders_path.display()))?;
        Self::new(model, encoders)
    }

    /// Pairs a model with an encoder table, rejecting version skew:
    /// an encoder for a field the model was never fitted on means the
    /// two artifacts come from different training runs.
    pub fn new(model: FittedModel, encoders: EncoderTable) -> anyhow::Result<Self> {
        for field in encoders.field_names() {
            if !model.feature_names().iter().any(|c| c == field) {
                bail!(
                    "encoder table covers field '{field}' the model was not fitted on; \
                     the artifacts belong to different training runs"
                );
            }
        }
        info!(
            "artifacts ready: {} features, {} categorical",
            model.feature_names().len(),
            encoders.len()
        );
        Ok(Self { model, encoders })
    }
}
