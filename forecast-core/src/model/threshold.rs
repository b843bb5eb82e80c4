//! Decision Threshold
//!
//! Cut-off applied to the classifier's positive-class probability.

use serde::{Deserialize, Serialize};

use super::metadata::ModelMetadata;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionThreshold(f64);

impl Default for DecisionThreshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl DecisionThreshold {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Threshold from metadata, default when absent
    pub fn from_metadata(metadata: Option<&ModelMetadata>) -> Self {
        metadata
            .and_then(|m| m.threshold)
            .map(Self)
            .unwrap_or_default()
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Probability at or above the threshold counts as positive
    pub fn is_positive(&self, probability: f32) -> bool {
        f64::from(probability) >= self.0
    }
}
