//! Core error type

use thiserror::Error;

use crate::model::ModelKind;

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// Input is not a `YYYY-MM-DD` calendar date
    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate(String),

    /// Offset date falls outside the supported calendar
    #[error("Date out of supported range: {0}")]
    DateOutOfRange(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to load {kind} model: {reason}")]
    ModelLoad { kind: ModelKind, reason: String },

    #[error("Prediction error: {0}")]
    Inference(String),

    #[error("Metadata error: {0}")]
    Metadata(String),
}

impl ForecastError {
    /// True when the caller sent bad input (as opposed to a model fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidDate(_) | Self::DateOutOfRange(_))
    }
}
