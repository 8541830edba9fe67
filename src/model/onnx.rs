//! ONNX Runtime inference for the exported RandomForest. Input: [1, 11] f32.
//! Output: class probabilities, either a [1, 2] f32 tensor or the zipmap seq(map(int64, float)).

use super::{normalize_probabilities, ModelMetadata, ProbabilityClassifier};
use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::features::{FeatureVector, FEATURE_COUNT};
use ndarray::Array2;
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use tracing::{debug, info, warn};

pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    output_name: String,
    positive_class: usize,
    metadata: Option<ModelMetadata>,
}

impl OnnxClassifier {
    /// Load the artifact named by `config`, checking it against the sidecar metadata when present.
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        let path = config.resolved_model_path();
        if !path.exists() {
            return Err(ModelError::NotFound { path });
        }

        let metadata = ModelMetadata::load(&config.resolved_metadata_path())?;
        match metadata {
            Some(ref meta) => {
                meta.verify_schema()?;
                if config.verify_checksum && meta.sha256.is_some() {
                    let bytes = std::fs::read(&path)
                        .map_err(|e| ModelError::Metadata(format!("{}: {}", path.display(), e)))?;
                    meta.verify_checksum(&bytes)?;
                }
            }
            None => {
                warn!(
                    path = %path.display(),
                    "no model metadata; assuming built-in feature order"
                );
            }
        }

        let session = build_session(&path, config.intra_threads)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        let positive_class = metadata
            .as_ref()
            .map(|m| m.positive_class as usize)
            .unwrap_or(1);

        info!(
            path = %path.display(),
            input = %input_name,
            output = %output_name,
            model_type = metadata.as_ref().and_then(|m| m.model_type.as_deref()).unwrap_or("unknown"),
            trained_at = ?metadata.as_ref().and_then(|m| m.trained_at),
            "model loaded"
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            positive_class,
            metadata,
        })
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }
}

fn build_session(path: &Path, intra_threads: usize) -> Result<Session, ModelError> {
    ort::init()
        .with_name("dropout-predictor")
        .commit()
        .map_err(|e| ModelError::Deserialize(e.to_string()))?;

    Session::builder()
        .map_err(|e| ModelError::Deserialize(format!("session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| ModelError::Deserialize(format!("optimization level: {}", e)))?
        .with_intra_threads(intra_threads.max(1))
        .map_err(|e| ModelError::Deserialize(format!("intra threads: {}", e)))?
        .commit_from_file(path)
        .map_err(|e| ModelError::Deserialize(e.to_string()))
}

impl ProbabilityClassifier for OnnxClassifier {
    fn predict_proba(&mut self, features: &FeatureVector) -> Result<[f64; 2], ModelError> {
        let arr = Array2::from_shape_fn((1, FEATURE_COUNT), |(_, j)| features.values[j]);
        let input = Tensor::from_array(arr).map_err(|e| ModelError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let raw = extract_probabilities(&outputs, &self.output_name)?;
        debug!(p0 = raw[0], p1 = raw[1], "class probabilities");
        normalize_probabilities(raw)
    }

    fn positive_class(&self) -> usize {
        self.positive_class
    }
}

fn extract_probabilities(outputs: &SessionOutputs, output_name: &str) -> Result<[f64; 2], ModelError> {
    let output = outputs.get(output_name).ok_or_else(|| {
        ModelError::UnexpectedOutput(format!("model has no output named '{}'", output_name))
    })?;

    if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
        return from_tensor(data);
    }

    let dtype = output.dtype();
    if DynSequenceValueType::can_downcast(&dtype) {
        return from_sequence_map(output);
    }

    Err(ModelError::UnexpectedOutput(format!(
        "output '{}' is neither a float tensor nor a class→probability map",
        output_name
    )))
}

/// [1, 2] → both classes; [1, 1] → positive class only.
fn from_tensor(data: &[f32]) -> Result<[f64; 2], ModelError> {
    match data {
        [p0, p1, ..] => Ok([f64::from(*p0), f64::from(*p1)]),
        [p1] => Ok([1.0 - f64::from(*p1), f64::from(*p1)]),
        [] => Err(ModelError::UnexpectedOutput("empty probability tensor".into())),
    }
}

/// seq(map(int64, float)): one map per row, keyed by class label.
fn from_sequence_map(output: &DynValue) -> Result<[f64; 2], ModelError> {
    let allocator = Allocator::default();
    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| ModelError::Inference(e.to_string()))?;
    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(|e| ModelError::Inference(e.to_string()))?;
    let first = maps
        .first()
        .ok_or_else(|| ModelError::UnexpectedOutput("empty probability sequence".into()))?;
    let pairs = first
        .try_extract_key_values::<i64, f32>()
        .map_err(|e| ModelError::Inference(e.to_string()))?;
    from_class_map(&pairs)
}

/// Fold class-label → probability pairs into `[p(0), p(1)]`. A lone class implies the other.
fn from_class_map(pairs: &[(i64, f32)]) -> Result<[f64; 2], ModelError> {
    let mut probs = [None, None];
    for &(class, p) in pairs {
        if let Some(slot) = usize::try_from(class).ok().and_then(|c| probs.get_mut(c)) {
            *slot = Some(f64::from(p));
        }
    }
    match probs {
        [Some(p0), Some(p1)] => Ok([p0, p1]),
        [Some(p0), None] => Ok([p0, 1.0 - p0]),
        [None, Some(p1)] => Ok([1.0 - p1, p1]),
        [None, None] => Err(ModelError::UnexpectedOutput(
            "probability map has no entry for class 0 or 1".into(),
        )),
    }
}
