//! Risk labelling of dropout probabilities.

mod engine;

pub use engine::{percentage, RiskAssessment, RiskEngine, RiskLabel};
