//! Pre-trained artifacts
//!
//! The scaler and classifier are trained offline and exported as JSON with
//! an embedded feature schema. The runtime performs only inference: every
//! artifact is validated against the six-field measurement schema at load
//! time and is immutable afterwards.

pub mod classifier;
pub mod forest;
pub mod model;
pub mod scaler;
pub mod schema;
pub mod store;

pub use classifier::{ClassProbabilities, Classifier, HabitabilityLabel};
pub use forest::{ForestClassifier, Node, Tree};
pub use model::{ClassifierSpec, LogisticClassifier, ModelArtifact};
pub use scaler::ScalerArtifact;
pub use schema::{ArtifactSchema, SCHEMA_VERSION};
pub use store::ArtifactStore;

use std::io::ErrorKind;
use std::path::Path;

use crate::errors::ArtifactError;

/// Read an artifact file, separating "absent" from "unreadable"
pub(crate) fn read_artifact(kind: &'static str, path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ArtifactError::Missing {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Unreadable {
                kind,
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
