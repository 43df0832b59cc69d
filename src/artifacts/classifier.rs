//! Binary classifier contract
//!
//! Anything that maps a normalized six-element vector to a habitability
//! label and a two-class probability distribution can drive the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::PredictionError;

/// Allowed deviation of a probability pair from summing to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Binary habitability outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitabilityLabel {
    NotHabitable,
    Habitable,
}

impl HabitabilityLabel {
    pub fn class_index(self) -> u8 {
        match self {
            Self::NotHabitable => 0,
            Self::Habitable => 1,
        }
    }

    pub fn is_habitable(self) -> bool {
        matches!(self, Self::Habitable)
    }
}

impl fmt::Display for HabitabilityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotHabitable => f.write_str("not habitable"),
            Self::Habitable => f.write_str("habitable"),
        }
    }
}

/// Probability mass per class, as reported by the model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub not_habitable: f64,
    pub habitable: f64,
}

impl ClassProbabilities {
    pub fn new(not_habitable: f64, habitable: f64) -> Self {
        Self {
            not_habitable,
            habitable,
        }
    }

    /// Mass assigned to `label`, read from that class's own output
    pub fn for_label(&self, label: HabitabilityLabel) -> f64 {
        match label {
            HabitabilityLabel::NotHabitable => self.not_habitable,
            HabitabilityLabel::Habitable => self.habitable,
        }
    }

    /// Class with the larger mass; ties go to class 0
    pub fn argmax(&self) -> HabitabilityLabel {
        if self.habitable > self.not_habitable {
            HabitabilityLabel::Habitable
        } else {
            HabitabilityLabel::NotHabitable
        }
    }

    /// Both finite, both in [0, 1], summing to one within tolerance
    pub fn validate(&self) -> Result<(), PredictionError> {
        let in_unit = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        let sum = self.not_habitable + self.habitable;
        if !in_unit(self.not_habitable)
            || !in_unit(self.habitable)
            || (sum - 1.0).abs() > PROBABILITY_TOLERANCE
        {
            return Err(PredictionError::InvalidProbabilities {
                not_habitable: self.not_habitable,
                habitable: self.habitable,
            });
        }
        Ok(())
    }
}

/// A pre-trained binary classifier over normalized features
pub trait Classifier: Send + Sync {
    /// Input width the classifier was fitted on
    fn n_features(&self) -> usize;

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, PredictionError>;

    fn predict(&self, features: &[f64]) -> Result<HabitabilityLabel, PredictionError> {
        Ok(self.predict_proba(features)?.argmax())
    }

    /// Short human-readable description
    fn describe(&self) -> String {
        format!("classifier over {} features", self.n_features())
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn n_features(&self) -> usize {
        (**self).n_features()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, PredictionError> {
        (**self).predict_proba(features)
    }

    fn predict(&self, features: &[f64]) -> Result<HabitabilityLabel, PredictionError> {
        (**self).predict(features)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

pub(crate) fn check_width(expected: usize, features: &[f64]) -> Result<(), PredictionError> {
    if features.len() != expected {
        return Err(PredictionError::Classifier(format!(
            "expected {} features, got {}",
            expected,
            features.len()
        )));
    }
    Ok(())
}

/// Dot product of two equal-length slices
pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Logistic sigmoid σ(z) = 1 / (1 + e^(-z)), stable for large |z|
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
