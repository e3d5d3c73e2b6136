//! Pre-trained language classifiers.

use super::vectorizer::SparseVector;
use crate::{LangIdError, Result};
use serde::{Deserialize, Serialize};

/// Classifier artifact, tagged by `kind`.
///
/// ```json
/// {"kind": "linear", "classes": ["english", "french"], "coef": [[0.4, -1.2]], "intercept": [0.1]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LanguageModel {
    /// Linear model (logistic regression, linear SVM, ...).
    ///
    /// With two classes and a single `coef` row, a positive score selects
    /// `classes[1]`.
    Linear {
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    /// Multinomial naive Bayes.
    MultinomialNb {
        classes: Vec<String>,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
    },
}

/// Predicted label with its confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

impl LanguageModel {
    pub fn classes(&self) -> &[String] {
        match self {
            Self::Linear { classes, .. } | Self::MultinomialNb { classes, .. } => classes,
        }
    }

    /// Check that the artifact is internally consistent and matches a
    /// vectorizer producing `n_features` columns.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        let classes = self.classes();
        if classes.len() < 2 {
            return Err(LangIdError::model(format!(
                "A classifier needs at least two classes, found {}",
                classes.len()
            )));
        }

        let (rows, offsets, what) = match self {
            Self::Linear { coef, intercept, .. } => (coef, intercept, "intercept"),
            Self::MultinomialNb {
                feature_log_prob,
                class_log_prior,
                ..
            } => (feature_log_prob, class_log_prior, "class_log_prior"),
        };

        let binary_linear = matches!(self, Self::Linear { .. }) && classes.len() == 2 && rows.len() == 1;
        if rows.len() != classes.len() && !binary_linear {
            return Err(LangIdError::model(format!(
                "Model has {} weight rows for {} classes",
                rows.len(),
                classes.len()
            )));
        }
        if offsets.len() != rows.len() {
            return Err(LangIdError::model(format!(
                "Model has {} {} values for {} weight rows",
                offsets.len(),
                what,
                rows.len()
            )));
        }
        if let Some(row) = rows.iter().find(|row| row.len() != n_features) {
            return Err(LangIdError::model(format!(
                "Model expects {} features but the vectorizer produces {}",
                row.len(),
                n_features
            )));
        }
        Ok(())
    }

    /// Raw decision values, one per weight row.
    pub fn decision_function(&self, features: &SparseVector) -> Vec<f64> {
        match self {
            Self::Linear { coef, intercept, .. } => coef
                .iter()
                .zip(intercept)
                .map(|(row, b)| features.dot(row) + b)
                .collect(),
            Self::MultinomialNb {
                feature_log_prob,
                class_log_prior,
                ..
            } => feature_log_prob
                .iter()
                .zip(class_log_prior)
                .map(|(row, prior)| features.dot(row) + prior)
                .collect(),
        }
    }

    /// Best class for `features`; ties go to the earliest class.
    pub fn predict(&self, features: &SparseVector) -> Prediction {
        let classes = self.classes();
        let scores = self.decision_function(features);

        if scores.len() == 1 {
            let p = sigmoid(scores[0]);
            return if scores[0] > 0.0 {
                Prediction {
                    label: classes[1].clone(),
                    confidence: p,
                }
            } else {
                Prediction {
                    label: classes[0].clone(),
                    confidence: 1.0 - p,
                }
            };
        }

        let probabilities = softmax(&scores);
        let (best, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bp), (i, p)| if p > bp { (i, p) } else { (bi, bp) });

        Prediction {
            label: classes[best].clone(),
            confidence,
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
