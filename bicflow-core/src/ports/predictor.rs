// bicflow-core/src/ports/predictor.rs

use serde::{Deserialize, Serialize};

use crate::domain::record::DerivedFeatureRecord;

/// Classification returned to the caller for one accepted row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: u8,
    pub confidence: f64,
    pub explanation: Vec<String>,
}

pub trait Predictor: Send + Sync {
    fn predict(&self, features: &DerivedFeatureRecord) -> Prediction;

    fn name(&self) -> &str;
}
