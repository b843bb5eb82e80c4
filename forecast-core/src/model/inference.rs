//! Inference Engine - ONNX Runtime Integration
//!
//! Loads the exported classifier/regressor graphs and scores one feature row.
//! The `Predictor` trait keeps the runtime swappable (and stubbable in tests).

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::features::FeatureRow;
use crate::error::{ForecastError, Result};

/// Classifier output holding per-class probabilities (skl2onnx, zipmap off)
const PROBABILITIES_OUTPUT: &str = "probabilities";

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Binary classifier; predicts the positive-class probability
    Classifier,
    /// Regressor; predicts a single value
    Regressor,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classifier => write!(f, "classifier"),
            Self::Regressor => write!(f, "regressor"),
        }
    }
}

/// Model status for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub path: String,
    pub kind: ModelKind,
    pub n_features: usize,
    pub inference_count: u64,
    pub avg_latency_ms: f32,
}

// ============================================================================
// INFERENCE ENGINE TRAIT
// ============================================================================

/// Anything that can score a single feature row
pub trait Predictor: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Width of the feature row the model expects
    fn n_features(&self) -> usize;

    /// Positive-class probability for classifiers, raw value for regressors
    fn predict(&self, row: &FeatureRow) -> Result<f32>;
}

// ============================================================================
// LATENCY STATS
// ============================================================================

#[derive(Debug, Default)]
pub struct InferenceStats {
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl InferenceStats {
    pub fn record(&self, elapsed: Duration) {
        self.latency_sum_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.inference_count.load(Ordering::Relaxed)
    }

    pub fn avg_latency_ms(&self) -> f32 {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.count();
        if count > 0 {
            (sum as f32 / count as f32) / 1000.0
        } else {
            0.0
        }
    }
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// An ONNX graph loaded into its own runtime session
pub struct OnnxModel {
    kind: ModelKind,
    n_features: usize,
    output_name: String,
    // running a session needs `&mut`
    session: Mutex<Session>,
}

fn load_error(kind: ModelKind, err: impl fmt::Display) -> ForecastError {
    ForecastError::ModelLoad {
        kind,
        reason: err.to_string(),
    }
}

fn inference_error(context: &str, err: impl fmt::Display) -> ForecastError {
    ForecastError::Inference(format!("{}: {}", context, err))
}

/// What the model core needs to know about one graph output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    pub name: String,
    pub is_float_tensor: bool,
}

/// Pick the output holding the prediction.
///
/// Classifiers prefer `probabilities`, then the last float tensor; regressors
/// take the first float tensor. Non-tensor outputs (zipmap) never qualify.
pub fn select_output(kind: ModelKind, outputs: &[OutputInfo]) -> Option<&OutputInfo> {
    let mut floats = outputs.iter().filter(|o| o.is_float_tensor);
    match kind {
        ModelKind::Classifier => outputs
            .iter()
            .find(|o| o.is_float_tensor && o.name == PROBABILITIES_OUTPUT)
            .or_else(|| floats.last()),
        ModelKind::Regressor => floats.next(),
    }
}

/// Feature width: graph dimension when static, else the declared one, else 0
pub fn input_width(graph_dim: Option<i64>, declared: Option<usize>) -> usize {
    match graph_dim {
        Some(width) if width > 0 => width as usize,
        _ => declared.unwrap_or(0),
    }
}

/// Prediction from a batch-of-one output buffer.
/// Classifiers read column 1 (positive class) when there are two columns.
pub fn positive_value(kind: ModelKind, data: &[f32]) -> Result<f32> {
    match kind {
        ModelKind::Classifier if data.len() >= 2 => Ok(data[1]),
        _ => data
            .first()
            .copied()
            .ok_or_else(|| ForecastError::Inference("Empty model output".to_string())),
    }
}

impl OnnxModel {
    /// Load a model from file.
    ///
    /// `declared_features` is used only when the graph's input width is
    /// dynamic; with neither available the model gets a zero-width row.
    pub fn load(path: &Path, kind: ModelKind, declared_features: Option<usize>) -> Result<Self> {
        log::info!("Loading ONNX {} from: {}", kind, path.display());

        if !path.exists() {
            return Err(ForecastError::ModelNotFound(path.display().to_string()));
        }

        let session = Session::builder()
            .map_err(|e| load_error(kind, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(kind, e))?
            .commit_from_file(path)
            .map_err(|e| load_error(kind, e))?;

        let graph_dim = session.inputs.first().and_then(|input| match &input.input_type {
            ValueType::Tensor { shape, .. } => shape.last().copied(),
            _ => None,
        });
        if !matches!(graph_dim, Some(width) if width > 0) {
            log::warn!(
                "{} input width is dynamic, using declared width {:?}",
                kind,
                declared_features
            );
        }
        let n_features = input_width(graph_dim, declared_features);

        let outputs: Vec<OutputInfo> = session
            .outputs
            .iter()
            .map(|o| OutputInfo {
                name: o.name.clone(),
                is_float_tensor: matches!(
                    &o.output_type,
                    ValueType::Tensor {
                        ty: TensorElementType::Float32,
                        ..
                    }
                ),
            })
            .collect();

        let output_name = select_output(kind, &outputs)
            .map(|o| o.name.clone())
            .ok_or_else(|| load_error(kind, "graph declares no float tensor output"))?;

        log::info!(
            "ONNX {} loaded ({} features, output '{}')",
            kind,
            n_features,
            output_name
        );

        Ok(Self {
            kind,
            n_features,
            output_name,
            session: Mutex::new(session),
        })
    }
}

impl Predictor for OnnxModel {
    fn kind(&self) -> ModelKind {
        self.kind
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, row: &FeatureRow) -> Result<f32> {
        let input_array = Array2::<f32>::from_shape_vec((1, row.len()), row.values().to_vec())
            .map_err(|e| inference_error("Array error", e))?;

        let input_tensor =
            Tensor::from_array(input_array).map_err(|e| inference_error("Tensor error", e))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| inference_error("Inference failed", e))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ForecastError::Inference(format!("No output '{}'", self.output_name)))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| inference_error("Extract error", e))?;

        positive_value(self.kind, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let result = OnnxModel::load(
            Path::new("/nonexistent/rain_classifier.onnx"),
            ModelKind::Classifier,
            None,
        );
        assert!(matches!(result, Err(ForecastError::ModelNotFound(_))));
    }

    #[test]
    fn test_garbage_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("precipitation_regressor.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();

        let result = OnnxModel::load(&path, ModelKind::Regressor, Some(4));
        assert!(matches!(
            result,
            Err(ForecastError::ModelLoad {
                kind: ModelKind::Regressor,
                ..
            })
        ));
    }

    #[test]
    fn test_stats_average() {
        let stats = InferenceStats::default();
        assert_eq!(stats.avg_latency_ms(), 0.0);

        stats.record(Duration::from_micros(1000));
        stats.record(Duration::from_micros(3000));
        assert_eq!(stats.count(), 2);
        assert!((stats.avg_latency_ms() - 2.0).abs() < 1e-6);
    }

    fn output(name: &str, is_float_tensor: bool) -> OutputInfo {
        OutputInfo {
            name: name.to_string(),
            is_float_tensor,
        }
    }

    #[test]
    fn test_classifier_prefers_probabilities() {
        let outputs = [
            output("label", false),
            output("probabilities", true),
            output("scores", true),
        ];
        let chosen = select_output(ModelKind::Classifier, &outputs).unwrap();
        assert_eq!(chosen.name, "probabilities");
    }

    #[test]
    fn test_classifier_falls_back_to_last_float() {
        let outputs = [
            output("label", false),
            output("raw_scores", true),
            output("calibrated", true),
            output("output_probability", false),
        ];
        let chosen = select_output(ModelKind::Classifier, &outputs).unwrap();
        assert_eq!(chosen.name, "calibrated");
    }

    #[test]
    fn test_zipmap_classifier_has_no_usable_output() {
        // skl2onnx default export: int64 label + sequence of maps
        let outputs = [output("output_label", false), output("output_probability", false)];
        assert!(select_output(ModelKind::Classifier, &outputs).is_none());

        // a non-float tensor named `probabilities` does not count either
        let outputs = [output("probabilities", false)];
        assert!(select_output(ModelKind::Classifier, &outputs).is_none());
    }

    #[test]
    fn test_regressor_takes_first_float() {
        let outputs = [
            output("index", false),
            output("variable", true),
            output("variance", true),
        ];
        let chosen = select_output(ModelKind::Regressor, &outputs).unwrap();
        assert_eq!(chosen.name, "variable");

        assert!(select_output(ModelKind::Regressor, &[]).is_none());
    }

    #[test]
    fn test_input_width() {
        assert_eq!(input_width(Some(14), Some(3)), 14);
        assert_eq!(input_width(Some(-1), Some(3)), 3);
        assert_eq!(input_width(None, Some(7)), 7);
        assert_eq!(input_width(Some(-1), None), 0);
        assert_eq!(input_width(None, None), 0);
    }

    #[test]
    fn test_positive_value() {
        assert_eq!(positive_value(ModelKind::Classifier, &[0.3, 0.7]).unwrap(), 0.7);
        assert_eq!(positive_value(ModelKind::Classifier, &[0.8]).unwrap(), 0.8);
        assert_eq!(positive_value(ModelKind::Regressor, &[4.5, 9.0]).unwrap(), 4.5);
        assert!(matches!(
            positive_value(ModelKind::Regressor, &[]),
            Err(ForecastError::Inference(_))
        ));
        assert!(positive_value(ModelKind::Classifier, &[]).is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ModelKind::Classifier.to_string(), "classifier");
        assert_eq!(ModelKind::Regressor.to_string(), "regressor");
    }
}
