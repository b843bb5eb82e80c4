//! Model metadata documents
//!
//! Optional JSON written next to each exported model. Only `threshold` and
//! `n_features` are interpreted; other keys are ignored.

use std::path::Path;

use serde_json::Value;

use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMetadata {
    /// Decision threshold for the positive class
    pub threshold: Option<f64>,
    /// Declared input width, for graphs with a dynamic input dimension
    pub n_features: Option<usize>,
}

impl ModelMetadata {
    /// Interpret a parsed document.
    ///
    /// `threshold` may be a number, a numeric string or a boolean (1.0/0.0);
    /// anything else makes the whole document invalid.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let object = raw
            .as_object()
            .ok_or_else(|| ForecastError::Metadata("document is not a JSON object".to_string()))?;

        let threshold = match object.get("threshold") {
            None => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
            Some(Value::String(s)) => Some(s.trim().parse::<f64>().map_err(|_| {
                ForecastError::Metadata(format!("threshold is not a number: {:?}", s))
            })?),
            Some(other) => {
                return Err(ForecastError::Metadata(format!(
                    "threshold is not a number: {}",
                    other
                )))
            }
        };

        let n_features = object
            .get("n_features")
            .and_then(Value::as_u64)
            .map(|n| n as usize);

        Ok(Self {
            threshold,
            n_features,
        })
    }

    /// Read a metadata file. `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ForecastError::Metadata(format!("{}: {}", path.display(), e)))?;
        let raw: Value = serde_json::from_str(&content)
            .map_err(|e| ForecastError::Metadata(format!("{}: {}", path.display(), e)))?;

        Self::from_value(&raw).map(Some)
    }

    /// Like `load`, but a broken document is logged and treated as absent
    pub fn load_or_warn(path: &Path) -> Option<Self> {
        match Self::load(path) {
            Ok(Some(meta)) => {
                log::info!("Loaded model metadata from {}", path.display());
                Some(meta)
            }
            Ok(None) => {
                log::info!("No model metadata at {}", path.display());
                None
            }
            Err(e) => {
                log::warn!("Ignoring model metadata: {}", e);
                None
            }
        }
    }
}
