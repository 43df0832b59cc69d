//! Measurement vector and field schema
//!
//! Range enforcement lives here for callers; the pipeline only rejects
//! non-finite values.

pub mod types;

pub use types::{parse_value, Field, FieldSpec, MeasurementVector, FEATURE_COUNT, FEATURE_NAMES};
