//! Categorical encoding: per-field bijections between category strings
//! and contiguous integer codes, persisted as one table and reused
//! verbatim at prediction time.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TabularError};
use crate::frame::{Column, Frame};

/// Code substituted by the batch path for values outside the fitted
/// vocabulary. The model never saw this code during fitting, so rows
/// carrying it predict with degraded quality.
pub const OOV_SENTINEL: i64 = -1;

/// The fitted bijection for one categorical field.
///
/// Classes are held in sorted lexicographic order; the code of a class
/// is its index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEncoder {
    classes: Vec<String>,
}

impl FieldEncoder {
    fn fit<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = values.collect();
        Self {
            classes: distinct.into_iter().map(str::to_string).collect(),
        }
    }

    /// The code assigned to `value`, if it was seen during fitting.
    pub fn code(&self, value: &str) -> Option<i64> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
            .map(|i| i as i64)
    }

    /// The class string behind `code`.
    pub fn class(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
    }

    /// All known classes, sorted.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// The persisted mapping from categorical field name to its fitted
/// bijection. Loaded and saved as one unit, never partially updated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderTable {
    fields: BTreeMap<String, FieldEncoder>,
}

impl EncoderTable {
    /// Fits an encoder for each named field and replaces the field's
    /// column with its integer codes, in place.
    ///
    /// Encoding is field-local: the codes assigned to one field never
    /// depend on any other field.
    ///
    /// # Errors
    /// Fails if a named field is absent or not a text column.
    pub fn fit_and_encode(frame: &mut Frame, fields: &[String]) -> Result<Self> {
        let mut table = Self::default();
        for field in fields {
            let column = frame
                .column(field)
                .ok_or_else(|| TabularError::MissingColumn {
                    name: field.clone(),
                })?;
            let Column::Text(values) = column else {
                return Err(TabularError::NotText {
                    column: field.clone(),
                });
            };
            let encoder = FieldEncoder::fit(values.iter().map(String::as_str));
            let codes = values
                .iter()
                .map(|v| Some(encoder.code(v).expect("value came from the fitted set") as f64))
                .collect();
            *frame.column_mut(field).expect("column exists") = Column::Numeric(codes);
            table.fields.insert(field.clone(), encoder);
        }
        Ok(table)
    }

    /// Batch path: encodes every text column of `frame` that has a
    /// fitted encoder, mapping out-of-vocabulary values to
    /// [`OOV_SENTINEL`]. Returns the number of sentinel substitutions.
    ///
    /// Fields in the table but absent from the frame are skipped, so a
    /// historical table stays usable against slightly drifted data.
    pub fn apply(&self, frame: &mut Frame) -> usize {
        let mut substituted = 0;
        for (field, encoder) in &self.fields {
            let Some(Column::Text(values)) = frame.column(field) else {
                continue;
            };
            let codes = values
                .iter()
                .map(|v| match encoder.code(v) {
                    Some(code) => Some(code as f64),
                    None => {
                        substituted += 1;
                        Some(OOV_SENTINEL as f64)
                    }
                })
                .collect();
            *frame.column_mut(field).expect("column exists") = Column::Numeric(codes);
        }
        if substituted > 0 {
            warn!("substituted the out-of-vocabulary sentinel {substituted} time(s)");
        }
        substituted
    }

    /// Strict path used by the live service: encodes one value, failing
    /// on unknown fields and on values outside the fitted vocabulary.
    ///
    /// # Errors
    /// `UnknownValue` carries the full allowed-value list for the
    /// caller.
    pub fn encode_value(&self, field: &str, value: &str) -> Result<i64> {
        let encoder = self
            .fields
            .get(field)
            .ok_or_else(|| TabularError::UnknownField {
                field: field.to_string(),
            })?;
        encoder.code(value).ok_or_else(|| TabularError::UnknownValue {
            field: field.to_string(),
            value: value.to_string(),
            allowed: encoder.classes().to_vec(),
        })
    }

    /// Inverse lookup for one field.
    pub fn decode(&self, field: &str, code: i64) -> Option<&str> {
        self.fields.get(field)?.class(code)
    }

    pub fn field(&self, name: &str) -> Option<&FieldEncoder> {
        self.fields.get(name)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Persists the whole table as one JSON artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| TabularError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Loads a previously saved table.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| TabularError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> Frame {
        Frame::new(
            vec!["school".into(), "sex".into(), "age".into()],
            vec![
                Column::Text(vec!["MS".into(), "GP".into(), "GP".into()]),
                Column::Text(vec!["F".into(), "M".into(), "F".into()]),
                Column::Numeric(vec![Some(15.0), Some(16.0), Some(17.0)]),
            ],
        )
    }

    #[test]
    fn codes_follow_sorted_class_order() {
        let mut frame = raw_frame();
        let table =
            EncoderTable::fit_and_encode(&mut frame, &["school".into(), "sex".into()]).unwrap();
        // GP sorts before MS
        assert_eq!(table.encode_value("school", "GP").unwrap(), 0);
        assert_eq!(table.encode_value("school", "MS").unwrap(), 1);
        let Some(Column::Numeric(school)) = frame.column("school") else {
            panic!("school must be encoded to numeric");
        };
        assert_eq!(school, &vec![Some(1.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn round_trips_every_fitted_value() {
        let mut frame = raw_frame();
        let table =
            EncoderTable::fit_and_encode(&mut frame, &["school".into(), "sex".into()]).unwrap();
        for field in ["school", "sex"] {
            for class in table.field(field).unwrap().classes().to_vec() {
                let code = table.encode_value(field, &class).unwrap();
                assert_eq!(table.decode(field, code), Some(class.as_str()));
            }
        }
    }

    #[test]
    fn encoding_is_field_local() {
        let mut frame = raw_frame();
        let table =
            EncoderTable::fit_and_encode(&mut frame, &["sex".into(), "school".into()]).unwrap();
        let mut other = raw_frame();
        let reversed =
            EncoderTable::fit_and_encode(&mut other, &["school".into(), "sex".into()]).unwrap();
        assert_eq!(table, reversed);
        assert_eq!(frame, other);
    }

    #[test]
    fn batch_apply_substitutes_the_sentinel() {
        let mut frame = raw_frame();
        let table =
            EncoderTable::fit_and_encode(&mut frame, &["school".into(), "sex".into()]).unwrap();

        let mut drifted = Frame::new(
            vec!["school".into(), "sex".into()],
            vec![
                Column::Text(vec!["GP".into(), "XX".into()]),
                Column::Text(vec!["F".into(), "M".into()]),
            ],
        );
        assert_eq!(table.apply(&mut drifted), 1);
        let Some(Column::Numeric(school)) = drifted.column("school") else {
            panic!("school must be encoded to numeric");
        };
        assert_eq!(school, &vec![Some(0.0), Some(OOV_SENTINEL as f64)]);
    }

    #[test]
    fn strict_path_rejects_with_the_allowed_list() {
        let mut frame = raw_frame();
        let table = EncoderTable::fit_and_encode(&mut frame, &["school".into()]).unwrap();
        let err = table.encode_value("school", "XX").unwrap_err();
        match err {
            TabularError::UnknownValue {
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
    fn save_load_round_trip() {
        let mut frame = raw_frame();
        let table =
            EncoderTable::fit_and_encode(&mut frame, &["school".into(), "sex".into()]).unwrap();
        let path = std::env::temp_dir().join(format!(
            "tabular-encoders-{}.json",
            std::process::id()
        ));
        table.save(&path).unwrap();
        let loaded = EncoderTable::load(&path).unwrap();
        assert_eq!(table, loaded);
        std::fs::remove_file(path).ok();
    }
}
