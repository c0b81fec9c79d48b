//! The request handlers and the pure prediction pipeline behind them:
//! validate, encode through the persisted table, reorder by name,
//! predict, band.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::remark::remark_for;
use crate::request::{FieldValue, StudentRecord};
use crate::state::Artifacts;

/// The successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub score: f64,
    pub remark: &'static str,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "student grade prediction service" }))
}

pub async fn predict(
    State(artifacts): State<Arc<Artifacts>>,
    Json(record): Json<StudentRecord>,
) -> Result<Json<Prediction>, ApiError> {
    predict_record(&artifacts, &record).map(Json)
}

/// The whole per-request pipeline as a pure function of the record and
/// the immutable artifacts.
///
/// Unlike the batch evaluation path, an out-of-vocabulary value here
/// is a hard rejection: a live caller must learn their input was
/// unusable instead of silently receiving a degraded score.
pub fn predict_record(
    artifacts: &Artifacts,
    record: &StudentRecord,
) -> Result<Prediction, ApiError> {
    record.validate()?;

    let mut encoded = HashMap::new();
    for (name, value) in record.fields() {
        let v = match value {
            FieldValue::Numeric(v) => v,
            FieldValue::Categorical(raw) => artifacts
                .encoders
                .encode_value(name, raw)
                .map_err(ApiError::from_encoding)? as f64,
        };
        encoded.insert(name.to_string(), v);
    }

    let score = round2(artifacts.model.predict(&encoded)?);
    Ok(Prediction {
        score,
        remark: remark_for(score),
    })
}

pub fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use regressor::{FittedModel, ForestParams, RandomForest, Regressor};
    use tabular::{Column, EncoderTable, Frame};

    use super::*;
    use crate::request::tests::valid_record;

    fn text(values: [&str; 4]) -> Column {
        Column::Text(values.iter().map(|s| s.to_string()).collect())
    }

    fn num(values: [f64; 4]) -> Column {
        Column::Numeric(values.iter().copied().map(Some).collect())
    }

    /// Four training rows covering a small vocabulary for every
    /// categorical field, laid out in dataset column order.
    fn artifacts() -> Artifacts {
        let columns: Vec<(&str, Column)> = vec![
            ("school", text(["GP", "MS", "GP", "MS"])),
            ("sex", text(["F", "M", "M", "F"])),
            ("age", num([15.0, 16.0, 17.0, 18.0])),
            ("address", text(["U", "R", "U", "R"])),
            ("famsize", text(["GT3", "LE3", "GT3", "LE3"])),
            ("Pstatus", text(["T", "A", "T", "A"])),
            ("Medu", num([1.0, 2.0, 3.0, 4.0])),
            ("Fedu", num([1.0, 2.0, 3.0, 4.0])),
            ("Mjob", text(["teacher", "other", "teacher", "other"])),
            ("Fjob", text(["other", "services", "other", "services"])),
            ("reason", text(["course", "home", "course", "home"])),
            ("guardian", text(["mother", "father", "mother", "father"])),
            ("traveltime", num([1.0, 2.0, 1.0, 2.0])),
            ("studytime", num([2.0, 1.0, 3.0, 2.0])),
            ("failures", num([0.0, 1.0, 0.0, 0.0])),
            ("schoolsup", text(["no", "yes", "no", "yes"])),
            ("famsup", text(["yes", "no", "yes", "no"])),
            ("paid", text(["no", "yes", "no", "yes"])),
            ("activities", text(["yes", "no", "yes", "no"])),
            ("nursery", text(["yes", "no", "yes", "no"])),
            ("higher", text(["yes", "no", "yes", "yes"])),
            ("internet", text(["yes", "no", "yes", "no"])),
            ("romantic", text(["no", "yes", "no", "yes"])),
            ("famrel", num([4.0, 3.0, 5.0, 4.0])),
            ("freetime", num([3.0, 2.0, 4.0, 3.0])),
            ("goout", num([2.0, 3.0, 2.0, 4.0])),
            ("Dalc", num([1.0, 2.0, 1.0, 1.0])),
            ("Walc", num([1.0, 3.0, 2.0, 1.0])),
            ("health", num([5.0, 4.0, 3.0, 5.0])),
            ("absences", num([4.0, 10.0, 2.0, 0.0])),
            ("G1", num([12.0, 8.0, 15.0, 17.0])),
            ("G2", num([13.0, 7.0, 15.0, 18.0])),
        ];
        let target = vec![13.0, 7.0, 16.0, 18.0];

        let names: Vec<String> = columns.iter().map(|(n, _)| n.to_string()).collect();
        let cols: Vec<Column> = columns.into_iter().map(|(_, c)| c).collect();
        let mut features = Frame::new(names, cols);

        let categorical = features.text_columns();
        let encoders = EncoderTable::fit_and_encode(&mut features, &categorical).unwrap();
        let x = features.to_matrix().unwrap();
        let rows: Vec<usize> = (0..x.nrows()).collect();
        let forest = RandomForest::fit(
            x.view(),
            &target,
            &rows,
            ForestParams {
                n_trees: 10,
                ..ForestParams::default()
            },
        )
        .unwrap();
        let model = FittedModel::new(features.names().to_vec(), Regressor::Forest(forest));
        Artifacts::new(model, encoders).unwrap()
    }

    #[test]
    fn a_valid_record_gets_a_score_and_a_matching_remark() {
        let artifacts = artifacts();
        let record = valid_record();
        let prediction = predict_record(&artifacts, &record).unwrap();
        assert!(prediction.score.is_finite());
        assert_eq!(prediction.score, round2(prediction.score));
        assert_eq!(prediction.remark, remark_for(prediction.score));
    }

    #[test]
    fn identical_requests_predict_byte_identically() {
        let artifacts = artifacts();
        let record = valid_record();
        let a = predict_record(&artifacts, &record).unwrap();
        let b = predict_record(&artifacts, &record).unwrap();
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.remark, b.remark);
    }

    #[test]
    fn out_of_vocabulary_school_is_rejected_with_the_allowed_list() {
        let artifacts = artifacts();
        let mut record = valid_record();
        record.student.school = "XX".to_string();
        let err = predict_record(&artifacts, &record).unwrap_err();
        match err {
            ApiError::Vocabulary {
                field,
                value,
                allowed,
            } => {
                assert_eq!(field, "school");
                assert_eq!(value, "XX");
                assert_eq!(allowed, ["GP", "MS"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn range_checks_run_before_any_encoding() {
        let artifacts = artifacts();
        let mut record = valid_record();
        record.student.age = 99;
        record.student.school = "XX".to_string();
        let err = predict_record(&artifacts, &record).unwrap_err();
        assert!(matches!(err, ApiError::Range { field: "age", .. }));
    }

    #[test]
    fn rounding_is_to_two_decimals() {
        assert_eq!(round2(13.456), 13.46);
        assert_eq!(round2(9.994), 9.99);
        assert_eq!(round2(14.0), 14.0);
    }
}
