//! Packaging-material classifier.
//!
//! Inference only. Models are trained offline and exported as JSON; the
//! bundled implementation evaluates a forest of binary decision trees.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use super::artifacts::{self, ArtifactError};

const MODEL_ARTIFACT: &str = "classifier";
const LABEL_ARTIFACT: &str = "label encoder";

/// Opaque predictor mapping a feature vector to a class index.
pub trait Classifier: Send + Sync {
    /// Expected feature vector length.
    fn n_features(&self) -> usize;
    /// Number of classes the predictor can emit.
    fn n_classes(&self) -> usize;
    fn predict(&self, features: &[f64]) -> Result<usize, PredictionError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("model expects {expected} features but received {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("feature vector contains a non-finite value at index {0}")]
    NonFiniteFeature(usize),
    #[error("class index {0} has no material label")]
    UnknownClass(usize),
}

/// Decision tree node. Samples with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Per-class training weights that reached the leaf.
    Leaf { value: Vec<f64> },
}

impl TreeNode {
    fn leaf_for(&self, features: &[f64]) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        match self {
            TreeNode::Leaf { value } => {
                if value.len() != n_classes {
                    return Err(format!(
                        "leaf has {} class weights, expected {n_classes}",
                        value.len()
                    ));
                }
                if value.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
                    return Err("leaf weights must be finite and non-negative".to_string());
                }
                Ok(())
            }
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(format!(
                        "split on feature {feature} but the model has {n_features} features"
                    ));
                }
                if !threshold.is_finite() {
                    return Err(format!("split on feature {feature} has a non-finite threshold"));
                }
                left.validate(n_features, n_classes)?;
                right.validate(n_features, n_classes)
            }
        }
    }
}

/// Forest of decision trees voting with averaged leaf distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsembleClassifier {
    n_features: usize,
    n_classes: usize,
    trees: Vec<TreeNode>,
}

impl TreeEnsembleClassifier {
    pub fn new(
        n_features: usize,
        n_classes: usize,
        trees: Vec<TreeNode>,
    ) -> Result<Self, ArtifactError> {
        let model = Self {
            n_features,
            n_classes,
            trees,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let reader = artifacts::open(MODEL_ARTIFACT, path.as_ref())?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let model: Self = artifacts::read_json(MODEL_ARTIFACT, reader)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.n_classes == 0 {
            return Err(ArtifactError::invalid(MODEL_ARTIFACT, "no classes declared"));
        }
        if self.trees.is_empty() {
            return Err(ArtifactError::invalid(MODEL_ARTIFACT, "ensemble has no trees"));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|reason| {
                    ArtifactError::invalid(MODEL_ARTIFACT, format!("tree {idx}: {reason}"))
                })?;
        }
        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for TreeEnsembleClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict(&self, features: &[f64]) -> Result<usize, PredictionError> {
        if features.len() != self.n_features {
            return Err(PredictionError::FeatureCountMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        if let Some(idx) = features.iter().position(|value| !value.is_finite()) {
            return Err(PredictionError::NonFiniteFeature(idx));
        }

        let mut votes = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = tree.leaf_for(features);
            let total: f64 = leaf.iter().sum();
            if total <= 0.0 {
                continue;
            }
            for (vote, weight) in votes.iter_mut().zip(leaf) {
                *vote += weight / total;
            }
        }

        // Lowest class index wins ties.
        let mut best = 0;
        for (class, vote) in votes.iter().enumerate().skip(1) {
            if *vote > votes[best] {
                best = class;
            }
        }
        Ok(best)
    }
}

/// Maps class indices back to packaging material names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDecoder {
    classes: Vec<String>,
}

impl LabelDecoder {
    pub fn new(classes: Vec<String>) -> Result<Self, ArtifactError> {
        let decoder = Self { classes };
        decoder.validate()?;
        Ok(decoder)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let reader = artifacts::open(LABEL_ARTIFACT, path.as_ref())?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let decoder: Self = artifacts::read_json(LABEL_ARTIFACT, reader)?;
        decoder.validate()?;
        Ok(decoder)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.classes.is_empty() {
            return Err(ArtifactError::invalid(LABEL_ARTIFACT, "no classes declared"));
        }
        if self.classes.iter().any(|class| class.trim().is_empty()) {
            return Err(ArtifactError::invalid(
                LABEL_ARTIFACT,
                "class names must be non-empty",
            ));
        }
        Ok(())
    }

    pub fn decode(&self, class: usize) -> Result<&str, PredictionError> {
        self.classes
            .get(class)
            .map(String::as_str)
            .ok_or(PredictionError::UnknownClass(class))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
