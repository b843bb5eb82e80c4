//! Forecast Core - model loading and forecast arithmetic
//!
//! Loads the rain classifier and the precipitation regressor once, and turns
//! an input date into the two forecasts served by the HTTP API.
//!
//! ```text
//! date string ──► parse (YYYY-MM-DD) ──► day offsets ──► zero feature row
//!                                                            │
//!                           JSON ◄── threshold / clamp ◄── model
//! ```

pub mod error;
pub mod forecast;
pub mod model;
pub mod service;

pub use error::{ForecastError, Result};
pub use forecast::{
    parse_date, precipitation_window, rain_target_date, round_precipitation,
    PrecipitationForecast, PrecipitationPrediction, PrecipitationWindow, RainForecast,
    RainPrediction, DATE_FORMAT,
};
pub use model::{
    DecisionThreshold, FeatureRow, ModelKind, ModelMetadata, ModelPaths, ModelStatus,
    OnnxModel, Predictor,
};
pub use service::{Forecaster, ForecasterStatus, ServedModel};
