//! Classifier capability and the ONNX Runtime implementation.

mod metadata;
mod onnx;

pub use metadata::{sha256_hex, ModelMetadata};
pub use onnx::OnnxClassifier;

use crate::error::ModelError;
use crate::features::FeatureVector;

/// A trained binary classifier: feature vector in, class-probability distribution out.
pub trait ProbabilityClassifier {
    /// Probabilities indexed by class label: `[p(0), p(1)]`.
    fn predict_proba(&mut self, features: &FeatureVector) -> Result<[f64; 2], ModelError>;

    /// Index of the dropout class in [`predict_proba`](Self::predict_proba)'s output.
    fn positive_class(&self) -> usize {
        1
    }
}

/// Validate a raw two-class distribution: finite, clamped to [0, 1].
pub(crate) fn normalize_probabilities(raw: [f64; 2]) -> Result<[f64; 2], ModelError> {
    if raw.iter().any(|p| !p.is_finite()) {
        return Err(ModelError::UnexpectedOutput(format!(
            "non-finite probability {:?}",
            raw
        )));
    }
    Ok([raw[0].clamp(0.0, 1.0), raw[1].clamp(0.0, 1.0)])
}
