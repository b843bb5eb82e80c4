//! Forecast dates and response shapes
//!
//! Both endpoints key off a single input date: the rain forecast targets the
//! day one week later, the precipitation forecast covers the next three days.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Accepted (and emitted) date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rain forecast horizon
pub const RAIN_HORIZON_DAYS: u64 = 7;

/// Precipitation window, inclusive, relative to the input date
pub const PRECIP_WINDOW_START_DAYS: u64 = 1;
pub const PRECIP_WINDOW_END_DAYS: u64 = 3;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainPrediction {
    pub date: String,
    pub will_rain: bool,
}

/// Response of the rain endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainForecast {
    pub input_date: String,
    pub prediction: RainPrediction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationPrediction {
    pub start_date: String,
    pub end_date: String,
    /// Cumulative millimetres, rounded to 2 decimals
    pub precipitation_fall: f64,
}

/// Response of the precipitation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationForecast {
    pub input_date: String,
    pub prediction: PrecipitationPrediction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecipitationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// ============================================================================
// DATE HANDLING
// ============================================================================

/// Parse a strict `YYYY-MM-DD` date.
///
/// chrono alone accepts unpadded fields and signed years, so the layout is
/// checked byte by byte before the calendar check.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !well_formed {
        return Err(ForecastError::InvalidDate(input.to_string()));
    }

    let date = NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| ForecastError::InvalidDate(input.to_string()))?;

    // calendar starts at year 1
    if date.year() < 1 {
        return Err(ForecastError::InvalidDate(input.to_string()));
    }

    Ok(date)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| ForecastError::DateOutOfRange(format_date(date)))
}

/// Day the rain forecast is about
pub fn rain_target_date(date: NaiveDate) -> Result<NaiveDate> {
    add_days(date, RAIN_HORIZON_DAYS)
}

pub fn precipitation_window(date: NaiveDate) -> Result<PrecipitationWindow> {
    Ok(PrecipitationWindow {
        start: add_days(date, PRECIP_WINDOW_START_DAYS)?,
        end: add_days(date, PRECIP_WINDOW_END_DAYS)?,
    })
}

/// Clamp a raw regressor output at zero and round to 2 decimals.
/// NaN collapses to 0.0; +inf has no JSON number and is an error.
pub fn round_precipitation(raw: f32) -> Result<f64> {
    let clamped = f64::from(raw).max(0.0);
    if !clamped.is_finite() {
        return Err(ForecastError::Inference(format!(
            "non-finite precipitation: {}",
            raw
        )));
    }
    Ok((clamped * 100.0).round() / 100.0)
}
