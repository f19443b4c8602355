//! Unified error hierarchy for liftrs
//!
//! The calculators themselves never fail on missing optional data; they fall
//! back to zeroed or identity output. Errors only surface when configuration
//! objects are validated, or at the I/O edges (config files, exports).

use thiserror::Error;

/// Top-level error type for all liftrs operations
#[derive(Debug, Error)]
pub enum LiftRsError {
    /// Out-of-range numeric configuration
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Plan or metrics (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// A configuration value outside its accepted range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    /// Numeric field outside its allowed range
    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// Several problems found while validating one object
    #[error("{} problems: {}", .0.len(), .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<InvalidInputError>),
}

impl InvalidInputError {
    pub fn out_of_range(
        field: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        InvalidInputError::OutOfRange {
            field: field.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Collapse a list of problems into a single error, if any
    pub fn from_problems(mut problems: Vec<InvalidInputError>) -> Option<Self> {
        match problems.len() {
            0 => None,
            1 => problems.pop(),
            _ => Some(InvalidInputError::Multiple(problems)),
        }
    }
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Nothing to export
    #[error("Nothing to export: {0}")]
    Empty(String),

    /// IO error while writing the output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

/// Result type alias for liftrs operations
pub type Result<T> = std::result::Result<T, LiftRsError>;

impl From<serde_json::Error> for LiftRsError {
    fn from(err: serde_json::Error) -> Self {
        LiftRsError::Serialization(err.to_string())
    }
}

impl LiftRsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiftRsError::InvalidInput(_) => ErrorSeverity::Warning,
            LiftRsError::Export(ExportError::Empty(_)) => ErrorSeverity::Info,
            LiftRsError::Configuration(_) => ErrorSeverity::Error,
            LiftRsError::Io(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LiftRsError::InvalidInput(err) => {
                format!("The workout plan has invalid settings: {}", err)
            }
            LiftRsError::Configuration(reason) => {
                format!("Configuration problem: {}. Check your config file.", reason)
            }
            LiftRsError::Serialization(reason) => {
                format!("Could not read workout data: {}", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
