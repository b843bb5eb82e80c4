//! Prediction handlers
//!
//! GET reads the date from the `date` query parameter, POST from a JSON body
//! `{"date": "YYYY-MM-DD"}`. Model calls run on the blocking pool.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use forecast_core::{PrecipitationForecast, RainForecast};
use serde::Deserialize;

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct DateRequest {
    pub date: Option<String>,
}

impl DateRequest {
    fn into_date(self) -> AppResult<String> {
        self.date
            .ok_or_else(|| AppError::ValidationError("Missing required parameter: date".to_string()))
    }
}

fn date_from_query(query: Result<Query<DateRequest>, QueryRejection>) -> AppResult<String> {
    let Query(req) = query.map_err(|e| AppError::ValidationError(e.body_text()))?;
    req.into_date()
}

fn date_from_body(body: Result<Json<DateRequest>, JsonRejection>) -> AppResult<String> {
    let Json(req) = body.map_err(|e| AppError::ValidationError(e.body_text()))?;
    req.into_date()
}

async fn rain_forecast(state: AppState, date: String) -> AppResult<Json<RainForecast>> {
    let forecaster = state.forecaster.clone();
    let forecast = tokio::task::spawn_blocking(move || forecaster.predict_rain(&date)).await??;
    Ok(Json(forecast))
}

async fn precipitation_forecast(
    state: AppState,
    date: String,
) -> AppResult<Json<PrecipitationForecast>> {
    let forecaster = state.forecaster.clone();
    let forecast =
        tokio::task::spawn_blocking(move || forecaster.predict_precipitation(&date)).await??;
    Ok(Json(forecast))
}

/// Will it rain 7 days after the given date
pub async fn rain(
    State(state): State<AppState>,
    query: Result<Query<DateRequest>, QueryRejection>,
) -> AppResult<Json<RainForecast>> {
    let date = date_from_query(query)?;
    rain_forecast(state, date).await
}

pub async fn rain_body(
    State(state): State<AppState>,
    body: Result<Json<DateRequest>, JsonRejection>,
) -> AppResult<Json<RainForecast>> {
    let date = date_from_body(body)?;
    rain_forecast(state, date).await
}

/// Cumulated precipitation over the 3 days after the given date
pub async fn precipitation(
    State(state): State<AppState>,
    query: Result<Query<DateRequest>, QueryRejection>,
) -> AppResult<Json<PrecipitationForecast>> {
    let date = date_from_query(query)?;
    precipitation_forecast(state, date).await
}

pub async fn precipitation_body(
    State(state): State<AppState>,
    body: Result<Json<DateRequest>, JsonRejection>,
) -> AppResult<Json<PrecipitationForecast>> {
    let date = date_from_body(body)?;
    precipitation_forecast(state, date).await
}
