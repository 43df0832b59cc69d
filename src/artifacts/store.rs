use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::artifacts::classifier::Classifier;
use crate::artifacts::model::ModelArtifact;
use crate::artifacts::scaler::ScalerArtifact;
use crate::errors::ArtifactError;
use crate::measurement::FEATURE_COUNT;

/// Scaler and model loaded together at process start
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    pub scaler: ScalerArtifact,
    pub model: ModelArtifact,
    pub scaler_path: PathBuf,
    pub model_path: PathBuf,
}

impl ArtifactStore {
    /// Load and cross-check both artifacts; any failure is fatal
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, ArtifactError> {
        let start = Instant::now();

        let scaler = ScalerArtifact::from_file(scaler_path)?;
        debug!(path = %scaler_path.display(), "scaler artifact loaded");

        let model = ModelArtifact::from_file(model_path)?;
        debug!(path = %model_path.display(), model_id = %model.model_id, "model artifact loaded");

        let store = Self::from_parts(scaler, model, scaler_path, model_path)?;

        info!(
            model = %store.model.describe(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "artifacts ready"
        );
        Ok(store)
    }

    /// Pair artifacts that were already read from disk
    pub fn from_parts(
        scaler: ScalerArtifact,
        model: ModelArtifact,
        scaler_path: &Path,
        model_path: &Path,
    ) -> Result<Self, ArtifactError> {
        let store = Self {
            scaler,
            model,
            scaler_path: scaler_path.to_path_buf(),
            model_path: model_path.to_path_buf(),
        };
        store.check_compatible()?;
        Ok(store)
    }

    /// Both artifacts must agree with the measurement vector width
    pub fn check_compatible(&self) -> Result<(), ArtifactError> {
        if self.scaler.n_features() != FEATURE_COUNT {
            return Err(ArtifactError::ArityMismatch {
                kind: "scaler",
                expected: FEATURE_COUNT,
                found: self.scaler.n_features(),
            });
        }
        if self.model.n_features() != FEATURE_COUNT {
            return Err(ArtifactError::ArityMismatch {
                kind: "model",
                expected: FEATURE_COUNT,
                found: self.model.n_features(),
            });
        }
        if self.scaler.schema != self.model.schema {
            return Err(ArtifactError::SchemaMismatch {
                kind: "model",
                expected: self.scaler.schema.features.join(", "),
                found: self.model.schema.features.join(", "),
            });
        }
        Ok(())
    }
}
