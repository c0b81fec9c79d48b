//! Shared driver pieces for the training and evaluation binaries: the
//! fixed pipeline constants and the raw-source preparation steps that
//! both entry points must perform identically.

use std::path::Path;

use log::{info, warn};
use tabular::assembly::{SUBJECT_COLUMN, Source, assemble};
use tabular::{Frame, Result};

/// The dependent column predicted by the model.
pub const TARGET_COLUMN: &str = "G3";

/// Seed for the held-out split and all stochastic fitting.
pub const SPLIT_SEED: u64 = 42;

/// Held-out fraction of the assembled data.
pub const TEST_FRACTION: f64 = 0.2;

/// Artifact file names inside the output directory.
pub const MODEL_FILE: &str = "model.json";
pub const ENCODERS_FILE: &str = "encoders.json";

/// The two raw survey files and how to read them. Both ship as
/// semicolon-delimited CSV.
pub fn sources<'a>(math: &'a Path, portuguese: &'a Path) -> [Source<'a>; 2] {
    [
        Source {
            path: math,
            delimiter: b';',
            subject: "math",
        },
        Source {
            path: portuguese,
            delimiter: b';',
            subject: "portuguese",
        },
    ]
}

/// Assembles and cleans the raw sources into a feature frame and the
/// target vector.
///
/// Rows missing the target are dropped (never imputed); remaining
/// numeric holes are median-filled; the provenance column is removed
/// from the features so the fitted column set matches the serving
/// field set.
pub fn prepare(math: &Path, portuguese: &Path) -> Result<(Frame, Vec<f64>)> {
    let mut frame = assemble(&sources(math, portuguese))?;

    let unlabeled = frame.drop_rows_missing(TARGET_COLUMN)?;
    if unlabeled > 0 {
        warn!("dropped {unlabeled} rows with no target value");
    }
    let imputed = frame.fill_missing_with_median();
    if imputed > 0 {
        info!("median-imputed {imputed} missing numeric cells");
    }

    let (mut features, target) = frame.split_target(TARGET_COLUMN)?;
    features.drop_column(SUBJECT_COLUMN)?;
    Ok((features, target))
}
