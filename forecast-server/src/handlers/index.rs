//! Service metadata handler

use std::collections::BTreeMap;

use axum::Json;
use serde::Serialize;

pub const PROJECT_NAME: &str = "Open Meteo Weather Prediction API";
pub const DESCRIPTION: &str = "Rain +7d classifier and 3-day precipitation regressor.";

#[derive(Serialize)]
pub struct IndexResponse {
    project: &'static str,
    version: &'static str,
    description: &'static str,
    endpoints: BTreeMap<&'static str, &'static str>,
    input_date_format: &'static str,
    github: &'static str,
}

pub async fn index() -> Json<IndexResponse> {
    let endpoints = BTreeMap::from([
        ("/health/", "Service health check"),
        ("/status/", "Loaded models, threshold and inference counters"),
        (
            "/predict/rain/",
            "Predict if it will rain exactly 7 days after the given date",
        ),
        (
            "/predict/precipitation/fall/",
            "Predict cumulated precipitation (mm) in the next 3 days",
        ),
    ]);

    Json(IndexResponse {
        project: PROJECT_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: DESCRIPTION,
        endpoints,
        input_date_format: "YYYY-MM-DD",
        github: "Add repo link in github.txt",
    })
}
