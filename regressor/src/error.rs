use std::{error::Error, fmt, io};

/// The regressor module's result type.
pub type Result<T> = std::result::Result<T, RegressorError>;

/// Failures while fitting, persisting, or applying a regressor.
#[derive(Debug)]
pub enum RegressorError {
    Io {
        path: String,
        source: io::Error,
    },
    Json(serde_json::Error),
    EmptyTrainingSet,
    LengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// The caller's column set does not match the fitted column order.
    /// A mismatch is a contract violation, never silently reordered
    /// away by dropping or defaulting columns.
    ColumnContract {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    InvalidConfig(String),
}

impl fmt::Display for RegressorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegressorError::Io { path, source } => write!(f, "io error on '{path}': {source}"),
            RegressorError::Json(e) => write!(f, "json error: {e}"),
            RegressorError::EmptyTrainingSet => write!(f, "training set has no rows"),
            RegressorError::LengthMismatch {
                what,
                got,
                expected,
            } => write!(f, "{what} length mismatch: got {got}, expected {expected}"),
            RegressorError::ColumnContract {
                missing,
                unexpected,
            } => write!(
                f,
                "feature columns do not match the fitted model: missing {missing:?}, unexpected {unexpected:?}"
            ),
            RegressorError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for RegressorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RegressorError::Io { source, .. } => Some(source),
            RegressorError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RegressorError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
