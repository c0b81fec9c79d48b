use std::{error::Error, fmt, io};

/// The tabular module's result type.
pub type Result<T> = std::result::Result<T, TabularError>;

/// Failures while assembling, transforming, or encoding tabular data.
#[derive(Debug)]
pub enum TabularError {
    Io {
        path: String,
        source: io::Error,
    },
    Csv(csv::Error),
    Json(serde_json::Error),
    /// Two sources disagree on the post-repair column set.
    SchemaMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },
    MissingColumn {
        name: String,
    },
    NotNumeric {
        column: String,
    },
    NotText {
        column: String,
    },
    MissingValue {
        column: String,
        row: usize,
    },
    EmptyFrame,
    UnknownField {
        field: String,
    },
    UnknownValue {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
}

impl fmt::Display for TabularError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabularError::Io { path, source } => write!(f, "io error on '{path}': {source}"),
            TabularError::Csv(e) => write!(f, "csv error: {e}"),
            TabularError::Json(e) => write!(f, "json error: {e}"),
            TabularError::SchemaMismatch { expected, got } => write!(
                f,
                "source column set mismatch: expected {expected:?}, got {got:?}"
            ),
            TabularError::MissingColumn { name } => write!(f, "column '{name}' not found"),
            TabularError::NotNumeric { column } => {
                write!(f, "column '{column}' is not numeric")
            }
            TabularError::NotText { column } => write!(f, "column '{column}' is not text"),
            TabularError::MissingValue { column, row } => {
                write!(f, "missing value in column '{column}' at row {row}")
            }
            TabularError::EmptyFrame => write!(f, "frame has no rows"),
            TabularError::UnknownField { field } => {
                write!(f, "no encoder fitted for field '{field}'")
            }
            TabularError::UnknownValue {
                field,
                value,
                allowed,
            } => write!(
                f,
                "unknown value '{value}' for field '{field}', allowed: {allowed:?}"
            ),
        }
    }
}

impl Error for TabularError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TabularError::Io { source, .. } => Some(source),
            TabularError::Csv(e) => Some(e),
            TabularError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for TabularError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for TabularError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
