use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::artifacts::classifier::{
    check_width, dot, sigmoid, ClassProbabilities, Classifier, HabitabilityLabel,
};
use crate::artifacts::forest::ForestClassifier;
use crate::artifacts::read_artifact;
use crate::artifacts::schema::ArtifactSchema;
use crate::errors::{ArtifactError, PredictionError};
use crate::measurement::{FEATURE_COUNT, FEATURE_NAMES};

const KIND: &str = "model";

/// Linear-logit classifier: P(habitable) = σ(w · x + b)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    /// Weight vector (length = FEATURE_COUNT).
    pub coefficients: Vec<f64>,
    /// Bias (intercept) term.
    pub intercept: f64,
}

impl LogisticClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, ArtifactError> {
        let model = Self {
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ArtifactError::ArityMismatch {
                kind: KIND,
                expected: FEATURE_COUNT,
                found: self.coefficients.len(),
            });
        }
        if let Some(i) = self.coefficients.iter().position(|w| !w.is_finite()) {
            return Err(ArtifactError::Invalid {
                kind: KIND,
                reason: format!("coefficient for {} is not finite", FEATURE_NAMES[i]),
            });
        }
        if !self.intercept.is_finite() {
            return Err(ArtifactError::Invalid {
                kind: KIND,
                reason: format!("intercept {} is not finite", self.intercept),
            });
        }
        Ok(())
    }

    /// Signed distance to the decision boundary
    pub fn decision_function(&self, features: &[f64]) -> Result<f64, PredictionError> {
        check_width(self.coefficients.len(), features)?;
        let z = dot(&self.coefficients, features) + self.intercept;
        if !z.is_finite() {
            return Err(PredictionError::Classifier(format!("decision value {} is not finite", z)));
        }
        Ok(z)
    }
}

impl Classifier for LogisticClassifier {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, PredictionError> {
        let z = self.decision_function(features)?;
        // Each class gets its own output; no 1 - p subtraction
        Ok(ClassProbabilities::new(sigmoid(-z), sigmoid(z)))
    }

    fn predict(&self, features: &[f64]) -> Result<HabitabilityLabel, PredictionError> {
        let z = self.decision_function(features)?;
        Ok(if z > 0.0 {
            HabitabilityLabel::Habitable
        } else {
            HabitabilityLabel::NotHabitable
        })
    }

    fn describe(&self) -> String {
        format!("logistic regression ({} coefficients)", self.coefficients.len())
    }
}

/// Concrete classifier carried by a model artifact, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Logistic(LogisticClassifier),
    Forest(ForestClassifier),
}

impl ClassifierSpec {
    fn as_classifier(&self) -> &dyn Classifier {
        match self {
            ClassifierSpec::Logistic(model) => model,
            ClassifierSpec::Forest(model) => model,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierSpec::Logistic(_) => "logistic",
            ClassifierSpec::Forest(_) => "forest",
        }
    }
}

/// Serialized classifier plus the schema it was fitted on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema: ArtifactSchema,
    /// Human-readable model identifier.
    pub model_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub classifier: ClassifierSpec,
}

impl ModelArtifact {
    pub fn new(model_id: impl Into<String>, classifier: ClassifierSpec) -> Result<Self, ArtifactError> {
        let artifact = Self {
            schema: ArtifactSchema::current(),
            model_id: model_id.into(),
            description: None,
            classifier,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Validate that the model is structurally sound.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        match &self.classifier {
            ClassifierSpec::Logistic(model) => model.validate()?,
            ClassifierSpec::Forest(model) => model.validate()?,
        }
        self.schema.check(KIND)
    }

    /// Load model from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let model: Self = serde_json::from_str(json)
            .map_err(|source| ArtifactError::Malformed { kind: KIND, source })?;
        model.validate()?;
        Ok(model)
    }

    /// Load model from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        Self::from_json(&read_artifact(KIND, path)?)
    }
}

impl Classifier for ModelArtifact {
    fn n_features(&self) -> usize {
        self.classifier.as_classifier().n_features()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, PredictionError> {
        self.classifier.as_classifier().predict_proba(features)
    }

    fn predict(&self, features: &[f64]) -> Result<HabitabilityLabel, PredictionError> {
        self.classifier.as_classifier().predict(features)
    }

    fn describe(&self) -> String {
        format!("{}: {}", self.model_id, self.classifier.as_classifier().describe())
    }
}
