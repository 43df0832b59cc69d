use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::artifacts::schema::ArtifactSchema;
use crate::artifacts::read_artifact;
use crate::errors::{ArtifactError, PredictionError};
use crate::measurement::{FEATURE_COUNT, FEATURE_NAMES};

const KIND: &str = "scaler";

/// Standardization parameters fitted at training time.
///
/// `normalized[i] = (raw[i] - mean[i]) / scale[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub schema: ArtifactSchema,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ScalerArtifact {
    /// Build a scaler for the current schema and validate it
    pub fn fitted(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        let scaler = Self {
            schema: ArtifactSchema::current(),
            mean,
            scale,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Scaler that passes values through unchanged
    pub fn identity() -> Self {
        Self {
            schema: ArtifactSchema::current(),
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        }
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Validate that the scaler is structurally sound.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        for (name, params) in [("mean", &self.mean), ("scale", &self.scale)] {
            if params.len() != FEATURE_COUNT {
                return Err(ArtifactError::ArityMismatch {
                    kind: KIND,
                    expected: FEATURE_COUNT,
                    found: params.len(),
                });
            }
            if let Some(i) = params.iter().position(|v| !v.is_finite()) {
                return Err(ArtifactError::Invalid {
                    kind: KIND,
                    reason: format!("{} for {} is not finite", name, FEATURE_NAMES[i]),
                });
            }
        }

        self.schema.check(KIND)?;

        if let Some(i) = self.scale.iter().position(|s| *s == 0.0) {
            return Err(ArtifactError::Invalid {
                kind: KIND,
                reason: format!("scale for {} is zero", FEATURE_NAMES[i]),
            });
        }

        Ok(())
    }

    /// Load scaler from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let scaler: Self = serde_json::from_str(json)
            .map_err(|source| ArtifactError::Malformed { kind: KIND, source })?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Load scaler from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        Self::from_json(&read_artifact(KIND, path)?)
    }

    /// Apply the fitted transform to one raw vector
    pub fn transform(&self, raw: &[f64; FEATURE_COUNT]) -> Result<[f64; FEATURE_COUNT], PredictionError> {
        if self.mean.len() != FEATURE_COUNT || self.scale.len() != FEATURE_COUNT {
            return Err(PredictionError::Classifier(format!(
                "scaler holds {} parameters, expected {}",
                self.mean.len(),
                FEATURE_COUNT
            )));
        }

        let mut normalized = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            let value = (raw[i] - self.mean[i]) / self.scale[i];
            if !value.is_finite() {
                return Err(PredictionError::NonFiniteScaled {
                    field: FEATURE_NAMES[i],
                    value,
                });
            }
            normalized[i] = value;
        }
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScalerArtifact {
        ScalerArtifact::fitted(
            vec![2.0, 800.0, 50.0, 5500.0, 1.0, 4.3],
            vec![3.0, 400.0, 100.0, 800.0, 0.5, 0.4],
        )
        .unwrap()
    }

    #[test]
    fn test_transform() {
        let scaler = sample();
        let out = scaler
            .transform(&[5.0, 400.0, 150.0, 5500.0, 2.0, 4.7])
            .unwrap();
        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!((out[1] + 1.0).abs() < 1e-12);
        assert!((out[2] - 1.0).abs() < 1e-12);
        assert!(out[3].abs() < 1e-12);
        assert!((out[4] - 2.0).abs() < 1e-12);
        assert!((out[5] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_identity() {
        let raw = [1.0, 288.0, 365.0, 5778.0, 1.0, 4.44];
        assert_eq!(ScalerArtifact::identity().transform(&raw).unwrap(), raw);
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let err = ScalerArtifact::fitted(vec![0.0; 5], vec![1.0; 5]).unwrap_err();
        assert!(matches!(err, ArtifactError::ArityMismatch { expected: 6, found: 5, .. }));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut scale = vec![1.0; 6];
        scale[3] = 0.0;
        let err = ScalerArtifact::fitted(vec![0.0; 6], scale).unwrap_err();
        assert!(err.to_string().contains("stellar_eff_temp"));
    }

    #[test]
    fn test_non_finite_parameter_rejected() {
        let mut mean = vec![0.0; 6];
        mean[1] = f64::NAN;
        assert!(ScalerArtifact::fitted(mean, vec![1.0; 6]).is_err());
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::to_string(&sample()).unwrap();
        let loaded = ScalerArtifact::from_json(&json).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            ScalerArtifact::from_json("{\"mean\": [1, 2"),
            Err(ArtifactError::Malformed { .. })
        ));
    }

    #[test]
    fn test_overflow_is_prediction_error() {
        let scaler = ScalerArtifact::fitted(vec![0.0; 6], vec![1e-300; 6]).unwrap();
        let err = scaler.transform(&[1e300; 6]).unwrap_err();
        assert!(matches!(err, PredictionError::NonFiniteScaled { .. }));
    }
}
