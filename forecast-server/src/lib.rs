//! Open Meteo Weather Prediction API
//!
//! Serves a rain classifier (+7 days) and a 3-day precipitation regressor
//! over JSON/HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 WEATHER PREDICTION API                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌────────────────────┐ │
//! │  │  Router   │──►│  Handlers    │──►│  Forecaster        │ │
//! │  │  (Axum)   │   │  (date I/O)  │   │  (forecast-core)   │ │
//! │  └───────────┘   └──────────────┘   └─────────┬──────────┘ │
//! │                                               ▼            │
//! │                                   ┌────────────────────┐   │
//! │                                   │ ONNX Runtime (ort) │   │
//! │                                   └────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use forecast_core::Forecaster;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub forecaster: Arc<Forecaster>,
    pub config: Config,
}

impl AppState {
    pub fn new(forecaster: Forecaster, config: Config) -> Self {
        Self {
            forecaster: Arc::new(forecaster),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let rain = get(handlers::predict::rain).post(handlers::predict::rain_body);
    let precipitation =
        get(handlers::predict::precipitation).post(handlers::predict::precipitation_body);

    Router::new()
        .route("/", get(handlers::index::index))
        .route("/health", get(handlers::health::check))
        .route("/health/", get(handlers::health::check))
        .route("/status", get(handlers::status::status))
        .route("/status/", get(handlers::status::status))
        // Predictions (with and without trailing slash)
        .route("/predict/rain", rain.clone())
        .route("/predict/rain/", rain)
        .route("/predict/precipitation/fall", precipitation.clone())
        .route("/predict/precipitation/fall/", precipitation.clone())
        .route("/predict/precip", precipitation.clone())
        .route("/predict/precip/", precipitation)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
