//! The request-path error taxonomy: caller faults carry a 4xx status
//! and a `{"error": ...}` payload naming the offending field; faults
//! in the loaded artifacts are 500s, kept distinct instead of caught
//! generically.

use std::{error::Error, fmt};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use regressor::RegressorError;
use serde_json::json;
use tabular::TabularError;

#[derive(Debug)]
pub enum ApiError {
    /// A numeric field fell outside its declared bound.
    Range {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    /// A categorical value the trained vocabulary has no code for.
    Vocabulary {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
    /// The request and the loaded artifacts disagree structurally.
    /// This is a deployment fault, not a caller fault.
    Artifact(String),
}

impl ApiError {
    /// Maps a strict-encoding failure onto the taxonomy: unknown value
    /// is the caller's fault, an unknown field means the encoder table
    /// and the model disagree.
    pub fn from_encoding(err: TabularError) -> Self {
        match err {
            TabularError::UnknownValue {
                field,
                value,
                allowed,
            } => ApiError::Vocabulary {
                field,
                value,
                allowed,
            },
            other => ApiError::Artifact(other.to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Range {
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "field '{field}' is {value}, outside the allowed range {min}..={max}"
            ),
            ApiError::Vocabulary {
                field,
                value,
                allowed,
            } => write!(
                f,
                "unknown value '{value}' for field '{field}', allowed: {allowed:?}"
            ),
            ApiError::Artifact(msg) => write!(f, "prediction artifacts are inconsistent: {msg}"),
        }
    }
}

impl Error for ApiError {}

impl From<RegressorError> for ApiError {
    fn from(value: RegressorError) -> Self {
        ApiError::Artifact(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Range { .. } | ApiError::Vocabulary { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Artifact(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_errors_surface_the_allowed_values() {
        let err = ApiError::from_encoding(TabularError::UnknownValue {
            field: "school".to_string(),
            value: "XX".to_string(),
            allowed: vec!["GP".to_string(), "MS".to_string()],
        });
        let text = err.to_string();
        assert!(text.contains("school"));
        assert!(text.contains("XX"));
        assert!(text.contains("GP"));
        assert!(text.contains("MS"));
    }

    #[test]
    fn unknown_fields_are_artifact_faults_not_caller_faults() {
        let err = ApiError::from_encoding(TabularError::UnknownField {
            field: "ghost".to_string(),
        });
        assert!(matches!(err, ApiError::Artifact(_)));
    }
}
