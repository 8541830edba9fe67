//! Prediction service: owns the classifier handle, coerces student records, scores them.
//!
//! The service is constructed before any request is served. `main` calls
//! [`PredictionService::load_model`] up front; prediction calls retry the load if it has not
//! succeeded yet and answer `{"error": "Model not loaded"}` when it still fails.
//! No prediction path panics or returns `Err`: every failure becomes a [`PredictionResult`].

use crate::config::{ModelConfig, ServiceConfig};
use crate::error::{ModelError, PredictionError};
use crate::features::StudentFeatures;
use crate::model::{OnnxClassifier, ProbabilityClassifier};
use crate::risk::{RiskAssessment, RiskEngine, RiskLabel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

pub const MODEL_NOT_LOADED: &str = "Model not loaded";

pub type LoadResult = Result<Box<dyn ProbabilityClassifier>, ModelError>;

/// Builds a classifier from the model section of the config.
pub type ClassifierLoader = Box<dyn Fn(&ModelConfig) -> LoadResult>;

/// One student's outcome, serialized in the same shape whether it succeeded or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionResult {
    Failed(FailedPrediction),
    Scored(RiskAssessment),
    Unavailable(ModelUnavailable),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedPrediction {
    pub error: String,
    pub dropout_risk: f64,
    pub dropout_percentage: f64,
    pub status: RiskLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUnavailable {
    pub error: String,
}

impl PredictionResult {
    pub fn failed(err: &PredictionError) -> Self {
        PredictionResult::Failed(FailedPrediction {
            error: format!("Prediction failed: {}", err),
            dropout_risk: 0.0,
            dropout_percentage: 0.0,
            status: RiskLabel::Unknown,
        })
    }

    pub fn unavailable() -> Self {
        PredictionResult::Unavailable(ModelUnavailable {
            error: MODEL_NOT_LOADED.to_string(),
        })
    }

    pub fn assessment(&self) -> Option<&RiskAssessment> {
        match self {
            PredictionResult::Scored(a) => Some(a),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PredictionResult::Scored(_) => None,
            PredictionResult::Failed(f) => Some(&f.error),
            PredictionResult::Unavailable(u) => Some(&u.error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }
}

pub struct PredictionService {
    config: ServiceConfig,
    risk: RiskEngine,
    classifier: Option<Box<dyn ProbabilityClassifier>>,
    loader: ClassifierLoader,
}

impl PredictionService {
    /// Service backed by the ONNX artifact named in `config`. Nothing is loaded yet.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_loader(
            config,
            Box::new(|model: &ModelConfig| -> LoadResult {
                Ok(Box::new(OnnxClassifier::load(model)?))
            }),
        )
    }

    /// Service with a custom way of producing the classifier.
    pub fn with_loader(config: ServiceConfig, loader: ClassifierLoader) -> Self {
        let risk = RiskEngine::new(config.risk.clone());
        Self {
            config,
            risk,
            classifier: None,
            loader,
        }
    }

    /// Service around an already-loaded classifier.
    pub fn with_classifier(config: ServiceConfig, classifier: Box<dyn ProbabilityClassifier>) -> Self {
        let mut service = Self::with_loader(
            config,
            Box::new(|_: &ModelConfig| -> LoadResult {
                Err(ModelError::Metadata("classifier was injected; nothing to reload".into()))
            }),
        );
        service.classifier = Some(classifier);
        service
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Load the classifier if not already loaded. Failures are logged, never propagated.
    pub fn load_model(&mut self) -> bool {
        if self.classifier.is_some() {
            return true;
        }
        match (self.loader)(&self.config.model) {
            Ok(classifier) => {
                info!("model ready");
                self.classifier = Some(classifier);
                true
            }
            Err(e) => {
                error!(error = %e, "failed to load model");
                false
            }
        }
    }

    /// Dropout risk for one student record.
    pub fn predict_single(&mut self, data: &Value) -> PredictionResult {
        if !self.load_model() {
            return PredictionResult::unavailable();
        }
        match self.score(data) {
            Ok(assessment) => {
                debug!(
                    dropout_risk = assessment.dropout_risk,
                    status = ?assessment.status,
                    "scored student"
                );
                PredictionResult::Scored(assessment)
            }
            Err(e) => {
                debug!(error = %e, "prediction failed");
                PredictionResult::failed(&e)
            }
        }
    }

    /// Dropout risk for each record, in input order. Elements fail independently.
    pub fn predict_batch(&mut self, items: &[Value]) -> Vec<PredictionResult> {
        if !self.load_model() {
            return items.iter().map(|_| PredictionResult::unavailable()).collect();
        }

        let results: Vec<PredictionResult> = items.iter().map(|d| self.predict_single(d)).collect();

        let failed = results.iter().filter(|r| r.is_error()).count();
        let high_risk = results
            .iter()
            .filter_map(PredictionResult::assessment)
            .filter(|a| a.status == RiskLabel::HighRisk)
            .count();
        info!(count = results.len(), high_risk, failed, "batch scored");

        results
    }

    fn score(&mut self, data: &Value) -> Result<RiskAssessment, PredictionError> {
        let features = StudentFeatures::from_json(data)?.to_vector();
        let classifier = self
            .classifier
            .as_mut()
            .ok_or_else(|| ModelError::Inference(MODEL_NOT_LOADED.to_string()))?;

        let probs = classifier.predict_proba(&features)?;
        let positive = classifier.positive_class();
        let probability = probs.get(positive).copied().ok_or_else(|| {
            ModelError::UnexpectedOutput(format!("positive class index {} out of range", positive))
        })?;

        Ok(self.risk.assess(probability))
    }
}
