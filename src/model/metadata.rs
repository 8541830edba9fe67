//! Sidecar metadata written by the trainer next to the artifact. Ties the artifact to the
//! feature order it was trained on so a reordered schema fails at load instead of silently
//! producing wrong scores.

use crate::error::ModelError;
use crate::features::feature_columns;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Column order used at training time
    pub feature_columns: Vec<String>,
    /// Label of the dropout class
    #[serde(default = "default_positive_class")]
    pub positive_class: i64,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    /// Hex sha256 of the ONNX artifact
    #[serde(default)]
    pub sha256: Option<String>,
}

fn default_positive_class() -> i64 {
    1
}

impl ModelMetadata {
    /// Read metadata if the sidecar exists. `Ok(None)` means no sidecar.
    pub fn load(path: &Path) -> Result<Option<Self>, ModelError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Metadata(format!("{}: {}", path.display(), e)))?;
        let meta = serde_json::from_str(&data)
            .map_err(|e| ModelError::Metadata(format!("{}: {}", path.display(), e)))?;
        Ok(Some(meta))
    }

    /// Fails unless the trained column order is exactly the service's order.
    pub fn verify_schema(&self) -> Result<(), ModelError> {
        let actual = feature_columns();
        if self.feature_columns != actual {
            return Err(ModelError::SchemaMismatch {
                expected: self.feature_columns.clone(),
                actual,
            });
        }
        if !(0..=1).contains(&self.positive_class) {
            return Err(ModelError::Metadata(format!(
                "positive_class must be 0 or 1, got {}",
                self.positive_class
            )));
        }
        Ok(())
    }

    /// Compare the artifact bytes against the recorded checksum, if any.
    pub fn verify_checksum(&self, model_bytes: &[u8]) -> Result<(), ModelError> {
        let Some(ref expected) = self.sha256 else {
            return Ok(());
        };
        let actual = sha256_hex(model_bytes);
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(ModelError::ChecksumMismatch {
                expected: expected.clone(),
                actual,
            });
        }
        Ok(())
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
