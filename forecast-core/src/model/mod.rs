//! Model Module - artifact discovery, metadata and inference
//!
//! Keeps the ONNX specifics behind the `Predictor` trait so the forecast
//! service and the HTTP layer never touch the runtime directly.

pub mod features;
pub mod inference;
pub mod metadata;
pub mod paths;
pub mod threshold;

// Re-export common types
pub use features::FeatureRow;
pub use inference::{InferenceStats, ModelKind, ModelStatus, OnnxModel, OutputInfo, Predictor};
pub use metadata::ModelMetadata;
pub use paths::{ModelPaths, PathSpec};
pub use threshold::DecisionThreshold;
