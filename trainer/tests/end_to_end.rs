//! The whole contract, end to end: raw delimited sources through
//! assembly, encoding, fitting, persistence, and back into a live
//! prediction that must stay deterministic and reorder-safe.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use regressor::split::train_test_split;
use regressor::{FittedModel, ForestParams, RandomForest, Regressor};
use tabular::{EncoderTable, TabularError};
use trainer::{SPLIT_SEED, TEST_FRACTION, prepare};

fn write_source(name: &str, subject_grade_shift: i32) -> PathBuf {
    let mut content = String::from("school;sex;age;studytime;G1;G2;G3\n");
    for i in 0..16i32 {
        let school = if i % 2 == 0 { "GP" } else { "MS" };
        let sex = if i % 3 == 0 { "F" } else { "M" };
        let age = 15 + (i % 6);
        let studytime = 1 + (i % 4);
        let g1 = 5 + (i % 12);
        let g2 = g1 + 1;
        let g3 = (g2 + subject_grade_shift).clamp(0, 20);
        content.push_str(&format!(
            "{school};{sex};{age};{studytime};{g1};{g2};{g3}\n"
        ));
    }
    // one row with an unparsable grade cell (median-imputed later)
    content.push_str("GP;F;17;2;not-a-number;9;8\n");
    // one unlabeled row (dropped before fitting)
    content.push_str("MS;M;18;3;10;11;\n");

    let path = std::env::temp_dir().join(format!(
        "trainer-e2e-{}-{name}.csv",
        std::process::id()
    ));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn train_persist_reload_predict() {
    let math = write_source("mat", 0);
    let portuguese = write_source("por", 1);

    let (mut features, target) = prepare(&math, &portuguese).unwrap();
    assert!(!features.names().contains(&"subject".to_string()));
    assert!(!features.names().contains(&"G3".to_string()));

    let categorical = features.text_columns();
    assert_eq!(categorical, ["school", "sex"]);
    let encoders = EncoderTable::fit_and_encode(&mut features, &categorical).unwrap();

    let x = features.to_matrix().unwrap();
    assert_eq!(target.len(), x.nrows());
    let (train, test) = train_test_split(x.nrows(), TEST_FRACTION, SPLIT_SEED);
    assert!(!test.is_empty());

    let forest = RandomForest::fit(
        x.view(),
        &target,
        &train,
        ForestParams {
            n_trees: 20,
            ..ForestParams::default()
        },
    )
    .unwrap();
    let model = FittedModel::new(features.names().to_vec(), Regressor::Forest(forest));

    let dir = std::env::temp_dir().join(format!("trainer-e2e-{}-out", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    model.save(&dir.join(trainer::MODEL_FILE)).unwrap();
    encoders.save(&dir.join(trainer::ENCODERS_FILE)).unwrap();

    let model = FittedModel::load(&dir.join(trainer::MODEL_FILE)).unwrap();
    let encoders = EncoderTable::load(&dir.join(trainer::ENCODERS_FILE)).unwrap();

    // a live record, encoded exactly the way the service does it
    let mut record = HashMap::new();
    record.insert(
        "school".to_string(),
        encoders.encode_value("school", "GP").unwrap() as f64,
    );
    record.insert(
        "sex".to_string(),
        encoders.encode_value("sex", "F").unwrap() as f64,
    );
    record.insert("age".to_string(), 16.0);
    record.insert("studytime".to_string(), 2.0);
    record.insert("G1".to_string(), 10.0);
    record.insert("G2".to_string(), 11.0);

    let first = model.predict(&record).unwrap();
    let second = model.predict(&record).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());
    assert!((0.0..=20.0).contains(&first));

    // the live path must reject what the table never saw
    let err = encoders.encode_value("school", "XX").unwrap_err();
    assert!(matches!(err, TabularError::UnknownValue { .. }));

    fs::remove_file(math).ok();
    fs::remove_file(portuguese).ok();
    fs::remove_dir_all(dir).ok();
}

#[test]
fn preparation_is_idempotent() {
    let math = write_source("idem-mat", 0);
    let portuguese = write_source("idem-por", 1);

    let (features_a, target_a) = prepare(&math, &portuguese).unwrap();
    let (features_b, target_b) = prepare(&math, &portuguese).unwrap();
    assert_eq!(features_a, features_b);
    assert_eq!(target_a, target_b);

    fs::remove_file(math).ok();
    fs::remove_file(portuguese).ok();
}
