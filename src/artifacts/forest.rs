//! Tree-ensemble classifier
//!
//! Trees are flat node arrays rooted at index 0. A split sends a sample left
//! when `x[feature] <= threshold`. Leaves hold a class distribution; the
//! forest averages leaf distributions across trees.

use serde::{Deserialize, Serialize};

use crate::artifacts::classifier::{check_width, ClassProbabilities, Classifier, PROBABILITY_TOLERANCE};
use crate::errors::{ArtifactError, PredictionError};
use crate::measurement::FEATURE_COUNT;

const KIND: &str = "model";

/// One node of a decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// [P(not habitable), P(habitable)]
        value: [f64; 2],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Check indices, leaf distributions and that every reachable node is
    /// reached exactly once
    fn validate(&self, tree_index: usize) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            kind: KIND,
            reason: format!("tree {}: {}", tree_index, reason),
        };

        if self.nodes.is_empty() {
            return Err(invalid("no nodes".to_string()));
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            if index >= self.nodes.len() {
                return Err(invalid(format!("child index {} out of bounds", index)));
            }
            if seen[index] {
                return Err(invalid(format!("node {} reachable more than once", index)));
            }
            seen[index] = true;

            match &self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(invalid(format!(
                            "node {} splits on feature {} (only {} features)",
                            index, feature, FEATURE_COUNT
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {} has non-finite threshold", index)));
                    }
                    stack.push(*left);
                    stack.push(*right);
                }
                Node::Leaf { value } => {
                    let sum: f64 = value.iter().sum();
                    let valid = value.iter().all(|p| p.is_finite() && *p >= 0.0)
                        && (sum - 1.0).abs() <= PROBABILITY_TOLERANCE;
                    if !valid {
                        return Err(invalid(format!(
                            "leaf {} distribution {:?} is not a probability pair",
                            index, value
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn evaluate(&self, features: &[f64]) -> Result<[f64; 2], PredictionError> {
        let mut index = 0;
        // A validated tree reaches a leaf in at most nodes.len() steps
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).ok_or_else(|| {
                        PredictionError::Classifier(format!("feature index {} out of bounds", feature))
                    })?;
                    index = if *x <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(PredictionError::Classifier(format!(
                        "node index {} out of bounds",
                        index
                    )))
                }
            }
        }
        Err(PredictionError::Classifier("tree walk did not reach a leaf".to_string()))
    }
}

/// Averaged ensemble of decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestClassifier {
    pub trees: Vec<Tree>,
}

impl ForestClassifier {
    pub fn new(trees: Vec<Tree>) -> Result<Self, ArtifactError> {
        let forest = Self { trees };
        forest.validate()?;
        Ok(forest)
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.trees.is_empty() {
            return Err(ArtifactError::Invalid {
                kind: KIND,
                reason: "forest has no trees".to_string(),
            });
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|t| t.nodes.len()).sum()
    }
}

impl Classifier for ForestClassifier {
    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, PredictionError> {
        check_width(FEATURE_COUNT, features)?;
        if self.trees.is_empty() {
            return Err(PredictionError::Classifier("forest has no trees".to_string()));
        }

        let mut totals = [0.0; 2];
        for tree in &self.trees {
            let value = tree.evaluate(features)?;
            totals[0] += value[0];
            totals[1] += value[1];
        }
        let n = self.trees.len() as f64;
        Ok(ClassProbabilities::new(totals[0] / n, totals[1] / n))
    }

    fn describe(&self) -> String {
        format!(
            "random forest ({} trees, {} nodes)",
            self.trees.len(),
            self.node_count()
        )
    }
}
