//! Error taxonomy, one enum per layer: model loading/inference, input coercion, request handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to load model: {0}")]
    Deserialize(String),

    #[error("failed to read model metadata: {0}")]
    Metadata(String),

    #[error("feature schema mismatch: model expects {expected:?}, service provides {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("model checksum mismatch: metadata says {expected}, artifact is {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum PreprocessError {
    #[error("student data must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("field '{field}' is not numeric: {value}")]
    NonNumeric { field: &'static str, value: String },

    #[error("field '{field}' is out of range for a model feature")]
    NonFinite { field: &'static str },
}

/// Anything that turns a single prediction into an error-shaped result.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    MalformedRequest(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
