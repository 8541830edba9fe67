//! Service configuration. Every field has a default; with no config file the service reads
//! `model_dropout_tuned.onnx` next to the executable and labels at a 0.5 threshold.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Artifact filename expected next to the executable.
pub const DEFAULT_MODEL_FILE: &str = "model_dropout_tuned.onnx";
/// Config filename looked up next to the executable.
pub const DEFAULT_CONFIG_FILE: &str = "dropout-predictor.json";
/// Env var overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "DROPOUT_PREDICTOR_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Model artifact and its sidecar metadata
    pub model: ModelConfig,
    /// Risk labelling threshold
    pub risk: RiskConfig,
    /// Logging (stderr only; stdout carries the response)
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX artifact; defaults to [`DEFAULT_MODEL_FILE`] beside the executable
    pub model_path: Option<PathBuf>,
    /// Path to the metadata sidecar; defaults to the model path with a `meta.json` extension
    pub metadata_path: Option<PathBuf>,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
    /// Compare the artifact's sha256 against metadata when the metadata carries one
    pub verify_checksum: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Probability strictly above this is high risk (0.0–1.0)
    pub high_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            metadata_path: None,
            intra_threads: 1,
            verify_checksum: true,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.5,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl ModelConfig {
    pub fn resolved_model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| exe_dir().join(DEFAULT_MODEL_FILE))
    }

    pub fn resolved_metadata_path(&self) -> PathBuf {
        self.metadata_path
            .clone()
            .unwrap_or_else(|| self.resolved_model_path().with_extension("meta.json"))
    }
}

impl ServiceConfig {
    /// Load from JSON file if present; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config location: `$DROPOUT_PREDICTOR_CONFIG`, else [`DEFAULT_CONFIG_FILE`] beside the executable.
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| exe_dir().join(DEFAULT_CONFIG_FILE))
    }
}

/// Directory holding the running executable, falling back to the working directory.
pub fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
