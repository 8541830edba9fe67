//! Dropout predictor — single-shot student dropout-risk scoring over an ONNX-exported RandomForest.
//!
//! Modular structure:
//! - [`config`] — Model location, risk threshold, logging
//! - [`features`] — Fixed 11-column feature schema and JSON coercion
//! - [`model`] — Classifier capability, ONNX inference, artifact metadata checks
//! - [`risk`] — Probability → percentage and risk label
//! - [`service`] — Model ownership and single/batch prediction
//! - [`protocol`] — Stdin/stdout request and response documents
//! - [`logging`] — Structured logging on stderr

pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod risk;
pub mod service;

pub use config::ServiceConfig;
pub use error::{ConfigError, ModelError, PredictionError, PreprocessError, ServiceError};
pub use features::{FeatureVector, StudentFeatures, FEATURE_COLUMNS};
pub use logging::StructuredLogger;
pub use model::{OnnxClassifier, ProbabilityClassifier};
pub use protocol::{handle_request, Request, Response};
pub use risk::{RiskEngine, RiskLabel};
pub use service::{PredictionResult, PredictionService};
