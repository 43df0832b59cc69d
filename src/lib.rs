//! Cosmic Oracle v0.3.0 - Exoplanet Habitability Inference
//!
//! Scores six planetary and stellar measurements with a pre-trained binary
//! classifier and reports whether the planet is likely habitable, together
//! with the confidence of that verdict.
//!
//! # Architecture
//!
//! - **Inputs**: measurement vector, field ranges and fixed profiles
//! - **Artifacts**: scaler and classifier loaded from schema-tagged JSON
//! - **Pipeline**: scaling, classification and confidence selection
//! - **Interface**: CLI, interactive form, batch scoring and diagnostics

pub mod errors;
pub mod measurement;
pub mod presets;

pub mod artifacts;
pub mod pipeline;

pub mod batch;
pub mod cli;
pub mod doctor;
pub mod logging;
pub mod repl;
pub mod telemetry;

// Re-export commonly used types
pub use artifacts::{ArtifactStore, Classifier, HabitabilityLabel, ModelArtifact, ScalerArtifact};
pub use errors::{ArtifactError, InputError, OracleError, PredictionError, Result};
pub use measurement::MeasurementVector;
pub use pipeline::{predict, InferencePipeline, PredictionResult};
