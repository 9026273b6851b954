use std::fmt;

/// Result type for qsearch operations
pub type Result<T> = std::result::Result<T, QSearchError>;

/// Main error type for the qsearch library
#[derive(Debug, Clone, PartialEq)]
pub enum QSearchError {
    /// Invalid configuration value or combination of values
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Failure raised by a scorer implementation
    ScorerFailure(String),

    /// Numerical computation errors
    NumericalError(String),

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for QSearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QSearchError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            QSearchError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            QSearchError::ScorerFailure(msg) => write!(f, "Scorer failure: {}", msg),
            QSearchError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            QSearchError::IoError(msg) => write!(f, "IO error: {}", msg),
            QSearchError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for QSearchError {}

impl From<std::io::Error> for QSearchError {
    fn from(err: std::io::Error) -> Self {
        QSearchError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for QSearchError {
    fn from(err: bincode::Error) -> Self {
        QSearchError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for QSearchError {
    fn from(err: serde_json::Error) -> Self {
        QSearchError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl QSearchError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        QSearchError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        QSearchError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by configuration rather than by runtime inputs
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, QSearchError::InvalidParameter { .. })
    }
}
