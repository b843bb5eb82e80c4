//! Feature Row - model input synthesis
//!
//! The service has no live weather features; every request scores a single
//! all-zero row as wide as the model's declared input.

/// One row of model input
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    values: Vec<f32>,
}

impl FeatureRow {
    /// Placeholder row of `width` zeros
    pub fn zeros(width: usize) -> Self {
        Self {
            values: vec![0.0; width],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
