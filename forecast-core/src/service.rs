//! Forecast service
//!
//! Owns both models for the process lifetime and answers the two forecast
//! questions for an input date string.

use std::time::Instant;

use serde::Serialize;

use crate::error::Result;
use crate::forecast::{
    format_date, parse_date, precipitation_window, rain_target_date, round_precipitation,
    PrecipitationForecast, PrecipitationPrediction, RainForecast, RainPrediction,
};
use crate::model::{
    DecisionThreshold, FeatureRow, InferenceStats, ModelKind, ModelMetadata, ModelPaths,
    ModelStatus, OnnxModel, Predictor,
};

/// A predictor plus where it came from and how it has been used
pub struct ServedModel {
    path: String,
    predictor: Box<dyn Predictor>,
    stats: InferenceStats,
}

impl ServedModel {
    pub fn new(path: impl Into<String>, predictor: Box<dyn Predictor>) -> Self {
        Self {
            path: path.into(),
            predictor,
            stats: InferenceStats::default(),
        }
    }

    /// Score the placeholder all-zero row
    fn predict_placeholder(&self) -> Result<f32> {
        let row = FeatureRow::zeros(self.predictor.n_features());

        let start = Instant::now();
        let result = self.predictor.predict(&row);
        self.stats.record(start.elapsed());

        result
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            path: self.path.clone(),
            kind: self.predictor.kind(),
            n_features: self.predictor.n_features(),
            inference_count: self.stats.count(),
            avg_latency_ms: self.stats.avg_latency_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecasterStatus {
    pub rain_model: ModelStatus,
    pub precipitation_model: ModelStatus,
    pub rain_threshold: f64,
}

pub struct Forecaster {
    rain: ServedModel,
    precipitation: ServedModel,
    threshold: DecisionThreshold,
}

impl Forecaster {
    pub fn new(rain: ServedModel, precipitation: ServedModel, threshold: DecisionThreshold) -> Self {
        Self {
            rain,
            precipitation,
            threshold,
        }
    }

    /// Load both models and their metadata.
    ///
    /// A missing or unreadable model is an error; metadata problems only
    /// fall back to defaults.
    pub fn load(paths: &ModelPaths) -> Result<Self> {
        let rain_meta = ModelMetadata::load_or_warn(&paths.rain_metadata);
        let precip_meta = ModelMetadata::load_or_warn(&paths.precip_metadata);

        let rain = OnnxModel::load(
            &paths.rain_model,
            ModelKind::Classifier,
            rain_meta.as_ref().and_then(|m| m.n_features),
        )?;
        let precipitation = OnnxModel::load(
            &paths.precip_model,
            ModelKind::Regressor,
            precip_meta.as_ref().and_then(|m| m.n_features),
        )?;

        let threshold = DecisionThreshold::from_metadata(rain_meta.as_ref());
        log::info!("Rain decision threshold: {}", threshold.value());

        Ok(Self::new(
            ServedModel::new(paths.rain_model.display().to_string(), Box::new(rain)),
            ServedModel::new(
                paths.precip_model.display().to_string(),
                Box::new(precipitation),
            ),
            threshold,
        ))
    }

    /// Will it rain exactly one week after `date`?
    pub fn predict_rain(&self, date: &str) -> Result<RainForecast> {
        let input_date = parse_date(date)?;
        let target = rain_target_date(input_date)?;

        let probability = self.rain.predict_placeholder()?;
        log::debug!("rain probability for {}: {}", target, probability);

        Ok(RainForecast {
            input_date: date.to_string(),
            prediction: RainPrediction {
                date: format_date(target),
                will_rain: self.threshold.is_positive(probability),
            },
        })
    }

    /// Cumulative precipitation over the three days after `date`
    pub fn predict_precipitation(&self, date: &str) -> Result<PrecipitationForecast> {
        let input_date = parse_date(date)?;
        let window = precipitation_window(input_date)?;

        let raw = self.precipitation.predict_placeholder()?;

        Ok(PrecipitationForecast {
            input_date: date.to_string(),
            prediction: PrecipitationPrediction {
                start_date: format_date(window.start),
                end_date: format_date(window.end),
                precipitation_fall: round_precipitation(raw)?,
            },
        })
    }

    pub fn status(&self) -> ForecasterStatus {
        ForecasterStatus {
            rain_model: self.rain.status(),
            precipitation_model: self.precipitation.status(),
            rain_threshold: self.threshold.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;

    struct Fixed {
        kind: ModelKind,
        width: usize,
        value: f32,
    }

    impl Predictor for Fixed {
        fn kind(&self) -> ModelKind {
            self.kind
        }

        fn n_features(&self) -> usize {
            self.width
        }

        fn predict(&self, row: &FeatureRow) -> Result<f32> {
            assert_eq!(row.len(), self.width);
            assert!(row.values().iter().all(|v| *v == 0.0));
            Ok(self.value)
        }
    }

    struct Broken;

    impl Predictor for Broken {
        fn kind(&self) -> ModelKind {
            ModelKind::Regressor
        }

        fn n_features(&self) -> usize {
            3
        }

        fn predict(&self, _row: &FeatureRow) -> Result<f32> {
            Err(ForecastError::Inference("shape mismatch".to_string()))
        }
    }

    fn forecaster(rain_proba: f32, precip: f32, threshold: f64) -> Forecaster {
        Forecaster::new(
            ServedModel::new(
                "rain.onnx",
                Box::new(Fixed {
                    kind: ModelKind::Classifier,
                    width: 5,
                    value: rain_proba,
                }),
            ),
            ServedModel::new(
                "precip.onnx",
                Box::new(Fixed {
                    kind: ModelKind::Regressor,
                    width: 8,
                    value: precip,
                }),
            ),
            DecisionThreshold::new(threshold),
        )
    }

    #[test]
    fn test_rain_forecast() {
        let f = forecaster(0.7, 1.0, 0.5);
        let forecast = f.predict_rain("2024-03-01").unwrap();

        assert_eq!(forecast.input_date, "2024-03-01");
        assert_eq!(forecast.prediction.date, "2024-03-08");
        assert!(forecast.prediction.will_rain);

        let dry = forecaster(0.2, 1.0, 0.5);
        assert!(!dry.predict_rain("2024-03-01").unwrap().prediction.will_rain);
    }

    #[test]
    fn test_threshold_from_metadata_applies() {
        let f = forecaster(0.4, 1.0, 0.35);
        assert!(f.predict_rain("2024-03-01").unwrap().prediction.will_rain);
    }

    #[test]
    fn test_precipitation_forecast() {
        let f = forecaster(0.1, 12.3456, 0.5);
        let forecast = f.predict_precipitation("2024-12-30").unwrap();

        assert_eq!(forecast.input_date, "2024-12-30");
        assert_eq!(forecast.prediction.start_date, "2024-12-31");
        assert_eq!(forecast.prediction.end_date, "2025-01-02");
        assert_eq!(forecast.prediction.precipitation_fall, 12.35);
    }

    #[test]
    fn test_negative_precipitation_clamped() {
        let f = forecaster(0.1, -3.0, 0.5);
        let forecast = f.predict_precipitation("2024-01-01").unwrap();
        assert_eq!(forecast.prediction.precipitation_fall, 0.0);
    }

    #[test]
    fn test_infinite_precipitation_is_server_error() {
        let f = forecaster(0.1, f32::INFINITY, 0.5);
        let err = f.predict_precipitation("2024-01-01").unwrap_err();
        assert!(matches!(err, ForecastError::Inference(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_invalid_date_skips_model() {
        let f = forecaster(0.9, 1.0, 0.5);
        assert!(matches!(f.predict_rain("2024-1-1"), Err(ForecastError::InvalidDate(_))));
        assert!(matches!(
            f.predict_precipitation("yesterday"),
            Err(ForecastError::InvalidDate(_))
        ));
        assert_eq!(f.status().rain_model.inference_count, 0);
        assert_eq!(f.status().precipitation_model.inference_count, 0);
    }

    #[test]
    fn test_model_failure_surfaces() {
        let f = Forecaster::new(
            ServedModel::new(
                "rain.onnx",
                Box::new(Fixed {
                    kind: ModelKind::Classifier,
                    width: 1,
                    value: 0.5,
                }),
            ),
            ServedModel::new("precip.onnx", Box::new(Broken)),
            DecisionThreshold::default(),
        );

        let err = f.predict_precipitation("2024-01-01").unwrap_err();
        assert!(!err.is_client_error());
        // failures still count as invocations
        assert_eq!(f.status().precipitation_model.inference_count, 1);
    }

    #[test]
    fn test_deterministic() {
        let f = forecaster(0.51, 4.2, 0.5);
        let first = f.predict_rain("2023-06-15").unwrap();
        let second = f.predict_rain("2023-06-15").unwrap();
        assert_eq!(first, second);

        let first = f.predict_precipitation("2023-06-15").unwrap();
        let second = f.predict_precipitation("2023-06-15").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_status() {
        let f = forecaster(0.7, 1.0, 0.6);
        f.predict_rain("2024-03-01").unwrap();

        let status = f.status();
        assert_eq!(status.rain_model.path, "rain.onnx");
        assert_eq!(status.rain_model.kind, ModelKind::Classifier);
        assert_eq!(status.rain_model.n_features, 5);
        assert_eq!(status.rain_model.inference_count, 1);
        assert_eq!(status.precipitation_model.n_features, 8);
        assert_eq!(status.rain_threshold, 0.6);
    }
}
