use serde::{Deserialize, Serialize};

use crate::errors::ArtifactError;
use crate::measurement::{FEATURE_COUNT, FEATURE_NAMES};

/// Artifact format version understood by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Feature schema embedded in every exported artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSchema {
    pub version: u32,
    /// Column names in fitted order
    pub features: Vec<String>,
}

impl ArtifactSchema {
    /// The schema of the six-field measurement vector
    pub fn current() -> Self {
        Self {
            version: SCHEMA_VERSION,
            features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Verify version, feature count and feature order
    pub fn check(&self, kind: &'static str) -> Result<(), ArtifactError> {
        if self.version != SCHEMA_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                kind,
                found: self.version,
                supported: SCHEMA_VERSION,
            });
        }

        if self.features.len() != FEATURE_COUNT {
            return Err(ArtifactError::ArityMismatch {
                kind,
                expected: FEATURE_COUNT,
                found: self.features.len(),
            });
        }

        let matches = self
            .features
            .iter()
            .zip(FEATURE_NAMES.iter())
            .all(|(found, expected)| found == expected);
        if !matches {
            return Err(ArtifactError::SchemaMismatch {
                kind,
                expected: FEATURE_NAMES.join(", "),
                found: self.features.join(", "),
            });
        }

        Ok(())
    }
}

impl Default for ArtifactSchema {
    fn default() -> Self {
        Self::current()
    }
}
