//! Weather endpoint. Live data when available, mock data otherwise.

use agent_tools::{WeatherData, WeatherForecast, WeatherLookup};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ok, Envelope};
use crate::error::{ApiError, Result};
use crate::state::AppState;

const DEFAULT_FORECAST_DAYS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherBody {
    pub location: Option<String>,
    pub action: Option<String>,
    pub days: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WeatherPayload {
    Current(WeatherData),
    Forecast(Vec<WeatherForecast>),
}

fn require_location(location: Option<String>, message: &str) -> Result<String> {
    location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

async fn current_or_mock(lookup: &WeatherLookup, location: &str) -> WeatherData {
    match lookup.current(location).await {
        Ok(data) => data,
        Err(e) => {
            info!("Weather API unavailable, using mock data: {}", e);
            WeatherLookup::mock(location)
        }
    }
}

/// `GET ?location=`.
pub async fn weather_get(
    State(state): State<AppState>,
    params: std::result::Result<Query<WeatherParams>, QueryRejection>,
) -> Result<Json<Envelope<WeatherData>>> {
    let Query(params) = params?;
    let location = require_location(params.location, "Location parameter is required")?;

    Ok(ok(current_or_mock(&state.toolkit.weather, &location).await))
}

/// `POST {location, action, days}` where action is `current` or `forecast`.
pub async fn weather_post(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WeatherBody>, JsonRejection>,
) -> Result<Json<Envelope<WeatherPayload>>> {
    let Json(body) = payload?;
    let location = require_location(body.location, "Location is required")?;
    let lookup = &state.toolkit.weather;

    let data = match body.action.as_deref().unwrap_or("current") {
        "current" => WeatherPayload::Current(current_or_mock(lookup, &location).await),
        "forecast" => {
            let days = body.days.unwrap_or(DEFAULT_FORECAST_DAYS);
            let forecast = match lookup.forecast(&location, days).await {
                Ok(forecast) => forecast,
                Err(e) => {
                    info!("Weather forecast API unavailable, using mock data: {}", e);
                    WeatherLookup::mock(&location).forecast
                }
            };
            WeatherPayload::Forecast(forecast)
        }
        _ => return Err(ApiError::invalid_action()),
    };

    Ok(ok(data))
}
