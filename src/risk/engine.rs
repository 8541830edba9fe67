//! Maps the model's dropout probability to a percentage and a risk label.

use crate::config::RiskConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    HighRisk,
    LowRisk,
    /// Prediction failed; no score available
    Unknown,
}

impl RiskLabel {
    pub fn from_probability(probability: f64, config: &RiskConfig) -> Self {
        if probability > config.high_threshold {
            RiskLabel::HighRisk
        } else {
            RiskLabel::LowRisk
        }
    }
}

/// Scored prediction for a single student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub dropout_risk: f64,
    pub dropout_percentage: f64,
    pub status: RiskLabel,
}

pub struct RiskEngine {
    config: RiskConfig,
}

impl RiskEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn assess(&self, probability: f64) -> RiskAssessment {
        RiskAssessment {
            dropout_risk: probability,
            dropout_percentage: percentage(probability),
            status: RiskLabel::from_probability(probability, &self.config),
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }
}

/// Probability as a percentage rounded to 2 decimals, halves to even.
pub fn percentage(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round_ties_even() / 100.0
}
