//! The sectioned request record and its validation: every numeric
//! field is range-checked against the bounds the training data obeys
//! before any encoding is attempted.

use serde::Deserialize;

use crate::error::ApiError;

/// One value from the flattened record, tagged by kind so the encoding
/// step knows which fields go through the vocabulary table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Numeric(f64),
    Categorical(&'a str),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentDetails {
    pub school: String,
    pub sex: String,
    pub age: i64,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyBackground {
    pub famsize: String,
    #[serde(rename = "Pstatus")]
    pub pstatus: String,
    #[serde(rename = "Medu")]
    pub medu: i64,
    #[serde(rename = "Fedu")]
    pub fedu: i64,
    #[serde(rename = "Mjob")]
    pub mjob: String,
    #[serde(rename = "Fjob")]
    pub fjob: String,
    pub reason: String,
    pub guardian: String,
    pub famsup: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AcademicStatus {
    pub traveltime: i64,
    pub studytime: i64,
    pub failures: i64,
    pub schoolsup: String,
    pub paid: String,
    pub activities: String,
    pub internet: String,
    pub nursery: String,
    pub higher: String,
    pub absences: i64,
    #[serde(rename = "G1")]
    pub g1: i64,
    #[serde(rename = "G2")]
    pub g2: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthStatus {
    pub romantic: String,
    pub famrel: i64,
    pub freetime: i64,
    pub goout: i64,
    #[serde(rename = "Dalc")]
    pub dalc: i64,
    #[serde(rename = "Walc")]
    pub walc: i64,
    pub health: i64,
}

/// The full record, grouped the way callers think about it: identity,
/// family background, academic history, health and lifestyle.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentRecord {
    pub student: StudentDetails,
    pub family: FamilyBackground,
    pub academic: AcademicStatus,
    pub health: HealthStatus,
}

impl StudentRecord {
    /// Checks every numeric field against its declared bound. The
    /// first violation rejects the record before anything is encoded.
    pub fn validate(&self) -> Result<(), ApiError> {
        let checks: [(&'static str, i64, i64, i64); 15] = [
            ("age", self.student.age, 15, 22),
            ("Medu", self.family.medu, 0, 4),
            ("Fedu", self.family.fedu, 0, 4),
            ("traveltime", self.academic.traveltime, 1, 4),
            ("studytime", self.academic.studytime, 1, 4),
            ("failures", self.academic.failures, 0, 4),
            ("absences", self.academic.absences, 0, 93),
            ("G1", self.academic.g1, 0, 20),
            ("G2", self.academic.g2, 0, 20),
            ("famrel", self.health.famrel, 1, 5),
            ("freetime", self.health.freetime, 1, 5),
            ("goout", self.health.goout, 1, 5),
            ("Dalc", self.health.dalc, 1, 5),
            ("Walc", self.health.walc, 1, 5),
            ("health", self.health.health, 1, 5),
        ];
        for (field, value, min, max) in checks {
            if value < min || value > max {
                return Err(ApiError::Range {
                    field,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Flattens the sections into the flat field set the model was
    /// trained on, in dataset column order.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        use FieldValue::{Categorical as Cat, Numeric as Num};
        vec![
            ("school", Cat(&self.student.school)),
            ("sex", Cat(&self.student.sex)),
            ("age", Num(self.student.age as f64)),
            ("address", Cat(&self.student.address)),
            ("famsize", Cat(&self.family.famsize)),
            ("Pstatus", Cat(&self.family.pstatus)),
            ("Medu", Num(self.family.medu as f64)),
            ("Fedu", Num(self.family.fedu as f64)),
            ("Mjob", Cat(&self.family.mjob)),
            ("Fjob", Cat(&self.family.fjob)),
            ("reason", Cat(&self.family.reason)),
            ("guardian", Cat(&self.family.guardian)),
            ("traveltime", Num(self.academic.traveltime as f64)),
            ("studytime", Num(self.academic.studytime as f64)),
            ("failures", Num(self.academic.failures as f64)),
            ("schoolsup", Cat(&self.academic.schoolsup)),
            ("famsup", Cat(&self.family.famsup)),
            ("paid", Cat(&self.academic.paid)),
            ("activities", Cat(&self.academic.activities)),
            ("nursery", Cat(&self.academic.nursery)),
            ("higher", Cat(&self.academic.higher)),
            ("internet", Cat(&self.academic.internet)),
            ("romantic", Cat(&self.health.romantic)),
            ("famrel", Num(self.health.famrel as f64)),
            ("freetime", Num(self.health.freetime as f64)),
            ("goout", Num(self.health.goout as f64)),
            ("Dalc", Num(self.health.dalc as f64)),
            ("Walc", Num(self.health.walc as f64)),
            ("health", Num(self.health.health as f64)),
            ("absences", Num(self.academic.absences as f64)),
            ("G1", Num(self.academic.g1 as f64)),
            ("G2", Num(self.academic.g2 as f64)),
        ]
    }
}
