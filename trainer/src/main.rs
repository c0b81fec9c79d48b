//! Training entry point: assemble the raw survey files, fit the
//! encoders and the regressor, report held-out quality, and persist
//! the two artifacts the prediction service loads at startup.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use log::info;
use regressor::search::{SearchGrid, grid_search};
use regressor::split::train_test_split;
use regressor::{FittedModel, ForestParams, RandomForest, Regressor, metrics};
use tabular::EncoderTable;
use trainer::{ENCODERS_FILE, MODEL_FILE, SPLIT_SEED, TEST_FRACTION, prepare};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let search = if let Some(pos) = args.iter().position(|a| a == "--search") {
        args.remove(pos);
        true
    } else {
        false
    };
    let [math, portuguese, out_dir] = args.as_slice() else {
        bail!("usage: trainer <math.csv> <portuguese.csv> <out-dir> [--search]");
    };
    let (math, portuguese) = (PathBuf::from(math), PathBuf::from(portuguese));
    let out_dir = PathBuf::from(out_dir);

    let (mut features, target) = prepare(&math, &portuguese)?;
    let categorical = features.text_columns();
    info!(
        "encoding {} categorical fields: {categorical:?}",
        categorical.len()
    );
    let encoders = EncoderTable::fit_and_encode(&mut features, &categorical)?;

    let x = features.to_matrix()?;
    let (train, test) = train_test_split(x.nrows(), TEST_FRACTION, SPLIT_SEED);
    info!(
        "fitting on {} rows, holding out {}",
        train.len(),
        test.len()
    );

    let regressor = if search {
        let outcome = grid_search(x.view(), &target, &train, &SearchGrid::default())?;
        outcome.candidate.fit(x.view(), &target, &train, SPLIT_SEED)?
    } else {
        Regressor::Forest(RandomForest::fit(
            x.view(),
            &target,
            &train,
            ForestParams::default(),
        )?)
    };
    let model = FittedModel::new(features.names().to_vec(), regressor);

    let truth: Vec<f64> = test.iter().map(|&r| target[r]).collect();
    let pred: Vec<f64> = test
        .iter()
        .map(|&r| {
            let row = x.row(r);
            model
                .regressor()
                .predict_row(row.as_slice().expect("row-major matrix"))
        })
        .collect();
    info!(
        "held-out mae {:.4}, mse {:.4}, r2 {:.4}",
        metrics::mean_absolute_error(&truth, &pred),
        metrics::mean_squared_error(&truth, &pred),
        metrics::r2_score(&truth, &pred),
    );

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("cannot create '{}'", out_dir.display()))?;
    model.save(&out_dir.join(MODEL_FILE))?;
    encoders.save(&out_dir.join(ENCODERS_FILE))?;
    info!("artifacts written to {}", out_dir.display());
    Ok(())
}
