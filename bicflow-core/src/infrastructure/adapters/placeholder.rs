// bicflow-core/src/infrastructure/adapters/placeholder.rs

use crate::domain::record::DerivedFeatureRecord;
use crate::ports::predictor::{Prediction, Predictor};

/// Contract stub standing in for a model. Every row gets the same class,
/// confidence and explanations; nothing is read from the features.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderPredictor;

impl PlaceholderPredictor {
    pub const CLASS: u8 = 1;
    pub const CONFIDENCE: f64 = 0.85;
    pub const EXPLANATION: [&'static str; 3] = [
        "High code churn increased risk",
        "Commit message complexity contributed",
        "Low developer experience",
    ];
}

impl Predictor for PlaceholderPredictor {
    fn predict(&self, _features: &DerivedFeatureRecord) -> Prediction {
        Prediction {
            prediction: Self::CLASS,
            confidence: Self::CONFIDENCE,
            explanation: Self::EXPLANATION.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}
