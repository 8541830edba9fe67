//! Stdin/stdout contract: one JSON request in, one JSON response out.
//!
//! Request: `{"operation": "predict_single" | "predict_batch", "data": object | [object]}`.
//! Prediction responses are pretty-printed (2-space indent); error envelopes are compact.

use crate::error::{json_kind, ServiceError};
use crate::service::{PredictionResult, PredictionService};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    PredictSingle,
    PredictBatch,
    Unknown(String),
}

impl Operation {
    pub fn parse(name: &str) -> Self {
        match name {
            "predict_single" => Operation::PredictSingle,
            "predict_batch" => Operation::PredictBatch,
            other => Operation::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operation::PredictSingle => "predict_single",
            Operation::PredictBatch => "predict_batch",
            Operation::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub operation: Operation,
    /// Raw payload; `None` when the key is absent
    pub data: Option<Value>,
}

impl Request {
    /// Parse a request document. A missing `operation` means `predict_single`; a non-string one
    /// is carried as an unknown operation named by its JSON text.
    pub fn parse(input: &str) -> Result<Self, ServiceError> {
        let value: Value = serde_json::from_str(input)?;
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(ServiceError::InvalidRequest(format!(
                    "request must be a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let operation = match obj.get("operation") {
            None => Operation::PredictSingle,
            Some(Value::String(name)) => Operation::parse(name),
            Some(other) => Operation::Unknown(other.to_string()),
        };
        let data = obj.remove("data");

        Ok(Self { operation, data })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Single(PredictionResult),
    Batch(Vec<PredictionResult>),
    Error(ErrorEnvelope),
}

impl Response {
    pub fn unknown_operation(name: &str) -> Self {
        Response::Error(ErrorEnvelope {
            error: format!("Unknown operation: {}", name),
        })
    }

    pub fn service_error(err: &ServiceError) -> Self {
        Response::Error(ErrorEnvelope {
            error: format!("Service error: {}", err),
        })
    }

    /// Text written to stdout.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        match self {
            Response::Error(envelope) => serde_json::to_string(envelope),
            other => serde_json::to_string_pretty(other),
        }
    }
}

/// Parse and dispatch one request. Every failure is folded into the response.
pub fn handle_request(service: &mut PredictionService, input: &str) -> Response {
    match Request::parse(input) {
        Ok(request) => dispatch(service, request),
        Err(e) => {
            warn!(error = %e, "rejected request");
            Response::service_error(&e)
        }
    }
}

pub fn dispatch(service: &mut PredictionService, request: Request) -> Response {
    info!(operation = request.operation.as_str(), "handling request");
    match request.operation {
        Operation::PredictSingle => {
            let data = request.data.unwrap_or_else(|| Value::Object(Map::new()));
            Response::Single(service.predict_single(&data))
        }
        Operation::PredictBatch => match request.data {
            None => Response::Batch(Vec::new()),
            Some(Value::Array(items)) => Response::Batch(service.predict_batch(&items)),
            Some(other) => {
                let err = ServiceError::InvalidRequest(format!(
                    "predict_batch expects 'data' to be an array, got {}",
                    json_kind(&other)
                ));
                warn!(error = %err, "rejected request");
                Response::service_error(&err)
            }
        },
        Operation::Unknown(name) => {
            warn!(operation = %name, "unknown operation");
            Response::unknown_operation(&name)
        }
    }
}
