//! Error types for Cosmic Oracle
//!
//! Three failure families map onto how the caller reacts:
//! artifact problems are fatal at startup, input problems are recovered by
//! re-prompting, and prediction problems fail a single request.

use std::path::PathBuf;
use thiserror::Error;

/// Scaler or model artifact missing, unreadable or incompatible
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("{kind} artifact not found at {path}")]
    Missing { kind: &'static str, path: PathBuf },

    #[error("Failed to read {kind} artifact {path}: {source}")]
    Unreadable {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {kind} artifact: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported {kind} artifact schema version {found} (supported: {supported})")]
    UnsupportedVersion {
        kind: &'static str,
        found: u32,
        supported: u32,
    },

    #[error("{kind} artifact was fitted on features [{found}], expected [{expected}]")]
    SchemaMismatch {
        kind: &'static str,
        expected: String,
        found: String,
    },

    /// Parameter arity disagrees with the six-field measurement vector
    #[error("{kind} artifact expects {found} features, measurement vector has {expected}")]
    ArityMismatch {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid {kind} artifact: {reason}")]
    Invalid { kind: &'static str, reason: String },
}

/// Measurement rejected before it reaches the scaler
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("Could not parse '{input}' as a number for {field}")]
    Parse { field: String, input: String },

    #[error("Expected {expected} values, got {got}")]
    WrongArity { expected: usize, got: usize },
}

/// Failure inside the scaler/model transform for one request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Scaled value for {field} is not finite ({value})")]
    NonFiniteScaled { field: &'static str, value: f64 },

    #[error("Classifier returned invalid probabilities [{not_habitable}, {habitable}]")]
    InvalidProbabilities { not_habitable: f64, habitable: f64 },

    #[error("Classifier failure: {0}")]
    Classifier(String),
}

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum OracleError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Catalog CSV errors
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl OracleError {
    /// Whether the caller can recover by asking for new input
    pub fn is_recoverable(&self) -> bool {
        matches!(self, OracleError::Input(_) | OracleError::Prediction(_))
    }
}

/// Result type alias for oracle operations
pub type Result<T> = std::result::Result<T, OracleError>;
