//! Inference pipeline
//!
//! measurement → finite check → feature scaling → classification →
//! confidence of the predicted class. Pure with respect to its inputs: the
//! artifacts are borrowed immutably and nothing is retained between calls.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifacts::{
    ArtifactStore, ClassProbabilities, Classifier, HabitabilityLabel, ScalerArtifact,
};
use crate::errors::{ArtifactError, Result};
use crate::measurement::{MeasurementVector, FEATURE_COUNT};

/// Outcome of one prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: HabitabilityLabel,
    /// Probability mass of the predicted class, percent, two decimals
    pub confidence_percent: f64,
    pub probabilities: ClassProbabilities,
}

impl PredictionResult {
    pub fn is_habitable(&self) -> bool {
        self.label.is_habitable()
    }

    /// The user-facing verdict line
    pub fn message(&self) -> String {
        match self.label {
            HabitabilityLabel::Habitable => format!(
                "Cosmic Scan Complete: This exoplanet shows signs of being habitable! (Confidence: {:.2}%)",
                self.confidence_percent
            ),
            HabitabilityLabel::NotHabitable => format!(
                "Cosmic Scan Complete: This exoplanet is likely hostile to life. (Confidence: {:.2}%)",
                self.confidence_percent
            ),
        }
    }
}

/// Verdict line for a failed prediction
pub fn failure_message(error: &dyn std::fmt::Display) -> String {
    format!("Cosmic Scan Failed: {}", error)
}

/// Percentage with two-decimal precision, kept inside [0, 100]
pub fn to_percent(probability: f64) -> f64 {
    ((probability * 100.0).clamp(0.0, 100.0) * 100.0).round() / 100.0
}

/// Run one measurement through `scaler` then `model`
pub fn predict<C>(
    measurement: &MeasurementVector,
    scaler: &ScalerArtifact,
    model: &C,
) -> Result<PredictionResult>
where
    C: Classifier + ?Sized,
{
    check_arity(scaler, model)?;
    measurement.validate_finite()?;

    let normalized = scaler.transform(&measurement.to_array())?;
    let label = model.predict(&normalized)?;
    let probabilities = model.predict_proba(&normalized)?;
    probabilities.validate()?;

    let result = PredictionResult {
        label,
        confidence_percent: to_percent(probabilities.for_label(label)),
        probabilities,
    };

    debug!(
        input = %measurement,
        label = %result.label,
        confidence = result.confidence_percent,
        "prediction"
    );
    Ok(result)
}

fn check_arity<C: Classifier + ?Sized>(scaler: &ScalerArtifact, model: &C) -> Result<()> {
    if scaler.n_features() != FEATURE_COUNT {
        return Err(ArtifactError::ArityMismatch {
            kind: "scaler",
            expected: FEATURE_COUNT,
            found: scaler.n_features(),
        }
        .into());
    }
    if model.n_features() != FEATURE_COUNT {
        return Err(ArtifactError::ArityMismatch {
            kind: "model",
            expected: FEATURE_COUNT,
            found: model.n_features(),
        }
        .into());
    }
    Ok(())
}

/// Scaler and classifier bound together for repeated predictions.
///
/// Holds no mutable state, so one instance can serve any number of callers.
pub struct InferencePipeline {
    scaler: ScalerArtifact,
    model: Box<dyn Classifier>,
}

impl InferencePipeline {
    /// Bind artifacts; fails if either disagrees with the six-field schema
    pub fn new(scaler: ScalerArtifact, model: Box<dyn Classifier>) -> Result<Self> {
        check_arity(&scaler, model.as_ref())?;
        Ok(Self { scaler, model })
    }

    pub fn from_store(store: ArtifactStore) -> Result<Self> {
        Self::new(store.scaler, Box::new(store.model))
    }

    pub fn predict(&self, measurement: &MeasurementVector) -> Result<PredictionResult> {
        predict(measurement, &self.scaler, self.model.as_ref())
    }

    pub fn model_description(&self) -> String {
        self.model.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{ClassifierSpec, LogisticClassifier, ModelArtifact};
    use crate::errors::{InputError, OracleError, PredictionError};

    /// Returns fixed probabilities and a fixed label regardless of input
    struct FixedClassifier {
        label: HabitabilityLabel,
        probabilities: ClassProbabilities,
        width: usize,
    }

    impl Classifier for FixedClassifier {
        fn n_features(&self) -> usize {
            self.width
        }

        fn predict_proba(
            &self,
            _features: &[f64],
        ) -> std::result::Result<ClassProbabilities, PredictionError> {
            Ok(self.probabilities)
        }

        fn predict(&self, _features: &[f64]) -> std::result::Result<HabitabilityLabel, PredictionError> {
            Ok(self.label)
        }
    }

    fn fixed(label: HabitabilityLabel, p0: f64, p1: f64) -> FixedClassifier {
        FixedClassifier {
            label,
            probabilities: ClassProbabilities::new(p0, p1),
            width: FEATURE_COUNT,
        }
    }

    fn earth() -> MeasurementVector {
        MeasurementVector::from_array([1.0, 288.0, 365.0, 5778.0, 1.0, 4.44])
    }

    #[test]
    fn test_habitable_confidence_is_class_one() {
        let model = fixed(HabitabilityLabel::Habitable, 0.1234, 0.8766);
        let result = predict(&earth(), &ScalerArtifact::identity(), &model).unwrap();
        assert_eq!(result.label, HabitabilityLabel::Habitable);
        assert_eq!(result.confidence_percent, 87.66);
    }

    #[test]
    fn test_not_habitable_confidence_is_class_zero() {
        let model = fixed(HabitabilityLabel::NotHabitable, 0.9, 0.1);
        let result = predict(&earth(), &ScalerArtifact::identity(), &model).unwrap();
        assert_eq!(result.label, HabitabilityLabel::NotHabitable);
        assert_eq!(result.confidence_percent, 90.0);
    }

    #[test]
    fn test_nan_input_is_input_error() {
        let mut m = earth();
        m.equilibrium_temp = f64::NAN;
        let model = fixed(HabitabilityLabel::Habitable, 0.0, 1.0);
        let err = predict(&m, &ScalerArtifact::identity(), &model).unwrap_err();
        assert!(matches!(
            err,
            OracleError::Input(InputError::NonFinite { field: "equilibrium_temp", .. })
        ));
    }

    #[test]
    fn test_invalid_probabilities_rejected() {
        let model = fixed(HabitabilityLabel::Habitable, 0.7, 0.7);
        let err = predict(&earth(), &ScalerArtifact::identity(), &model).unwrap_err();
        assert!(matches!(
            err,
            OracleError::Prediction(PredictionError::InvalidProbabilities { .. })
        ));
    }

    #[test]
    fn test_wrong_model_width_is_artifact_error() {
        let model = FixedClassifier {
            width: 5,
            ..fixed(HabitabilityLabel::Habitable, 0.0, 1.0)
        };
        let err = predict(&earth(), &ScalerArtifact::identity(), &model).unwrap_err();
        assert!(matches!(err, OracleError::Artifact(ArtifactError::ArityMismatch { .. })));

        assert!(InferencePipeline::new(ScalerArtifact::identity(), Box::new(model)).is_err());
    }

    #[test]
    fn test_to_percent() {
        assert_eq!(to_percent(0.123456), 12.35);
        assert_eq!(to_percent(1.0), 100.0);
        assert_eq!(to_percent(0.0), 0.0);
        assert_eq!(to_percent(1.0000001), 100.0);
    }

    #[test]
    fn test_messages() {
        let habitable = PredictionResult {
            label: HabitabilityLabel::Habitable,
            confidence_percent: 73.5,
            probabilities: ClassProbabilities::new(0.265, 0.735),
        };
        assert!(habitable.message().contains("signs of being habitable"));
        assert!(habitable.message().contains("73.50%"));

        let hostile = PredictionResult {
            label: HabitabilityLabel::NotHabitable,
            confidence_percent: 99.0,
            probabilities: ClassProbabilities::new(0.99, 0.01),
        };
        assert!(hostile.message().contains("hostile to life"));
        assert!(hostile.message().contains("99.00%"));

        let failed = failure_message(&"boom");
        assert!(failed.starts_with("Cosmic Scan Failed"));
    }

    #[test]
    fn test_pipeline_with_logistic() {
        let model = ModelArtifact::new(
            "unit",
            ClassifierSpec::Logistic(LogisticClassifier::new(vec![0.0; 6], 2.0).unwrap()),
        )
        .unwrap();
        let pipeline = InferencePipeline::new(ScalerArtifact::identity(), Box::new(model)).unwrap();
        let result = pipeline.predict(&earth()).unwrap();
        assert!(result.is_habitable());
        // σ(2) = 0.880797...
        assert_eq!(result.confidence_percent, 88.08);
        assert!(pipeline.model_description().starts_with("unit"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_pipeline_is_shareable_across_threads() {
        assert_send_sync::<InferencePipeline>();
        assert_send_sync::<ModelArtifact>();
        assert_send_sync::<ScalerArtifact>();

        let model = ModelArtifact::new(
            "unit",
            ClassifierSpec::Logistic(LogisticClassifier::new(vec![0.0; 6], -1.0).unwrap()),
        )
        .unwrap();
        let pipeline = InferencePipeline::new(ScalerArtifact::identity(), Box::new(model)).unwrap();
        let expected = pipeline.predict(&earth()).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| pipeline.predict(&earth()).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
