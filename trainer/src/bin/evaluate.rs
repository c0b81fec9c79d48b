//! Re-scores previously persisted artifacts against the raw survey
//! files: the saved encoder table re-encodes the data (batch path, so
//! drifted values fall back to the sentinel), the saved split seed
//! replays the same held-out partition, and the persisted model is
//! measured on it.

use std::env;
use std::path::PathBuf;

use anyhow::bail;
use log::{info, warn};
use regressor::split::train_test_split;
use regressor::{FittedModel, metrics};
use tabular::EncoderTable;
use tabular::assembly::{SUBJECT_COLUMN, assemble};
use trainer::{
    ENCODERS_FILE, MODEL_FILE, SPLIT_SEED, TARGET_COLUMN, TEST_FRACTION, sources,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let [math, portuguese, artifact_dir] = args.as_slice() else {
        bail!("usage: evaluate <math.csv> <portuguese.csv> <artifact-dir>");
    };
    let artifact_dir = PathBuf::from(artifact_dir);

    let model = FittedModel::load(&artifact_dir.join(MODEL_FILE))?;
    let encoders = EncoderTable::load(&artifact_dir.join(ENCODERS_FILE))?;
    info!(
        "loaded model ({} features) and {} encoders from {}",
        model.feature_names().len(),
        encoders.len(),
        artifact_dir.display()
    );

    let mut frame = assemble(&sources(&PathBuf::from(math), &PathBuf::from(portuguese)))?;
    frame.drop_rows_missing(TARGET_COLUMN)?;
    frame.fill_missing_with_median();
    let (mut features, target) = frame.split_target(TARGET_COLUMN)?;
    features.drop_column(SUBJECT_COLUMN)?;

    let substituted = encoders.apply(&mut features);
    if substituted > 0 {
        warn!(
            "{substituted} cells fell outside the trained vocabulary; \
             their rows predict with degraded quality"
        );
    }

    let x = features.to_matrix()?;
    // fail fast on any skew between the data columns and the model
    let permutation = model.permutation(features.names())?;
    let (_, test) = train_test_split(x.nrows(), TEST_FRACTION, SPLIT_SEED);

    let truth: Vec<f64> = test.iter().map(|&r| target[r]).collect();
    let pred: Vec<f64> = test
        .iter()
        .map(|&r| {
            let row: Vec<f64> = permutation.iter().map(|&c| x[[r, c]]).collect();
            model.regressor().predict_row(&row)
        })
        .collect();

    println!(
        "held-out mae {:.4}, mse {:.4}, r2 {:.4} over {} rows",
        metrics::mean_absolute_error(&truth, &pred),
        metrics::mean_squared_error(&truth, &pred),
        metrics::r2_score(&truth, &pred),
        test.len(),
    );
    Ok(())
}
