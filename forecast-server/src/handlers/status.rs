//! Model status handler

use axum::{extract::State, Json};
use forecast_core::ForecasterStatus;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    version: &'static str,
    environment: String,
    #[serde(flatten)]
    models: ForecasterStatus,
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        models: state.forecaster.status(),
    })
}
