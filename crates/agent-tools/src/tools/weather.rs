//! Weather tool using the OpenWeatherMap API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use indexmap::IndexMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ToolsConfig;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::tools::http_client;

/// Location used when a request names none.
pub const DEFAULT_LOCATION: &str = "New York";

/// Longest forecast the provider serves, in days.
pub const MAX_FORECAST_DAYS: usize = 5;

/// 3-hour intervals per day.
const SAMPLES_PER_DAY: usize = 8;

/// `Mon Jan 15 2024`.
const FORECAST_DATE: &str = "%a %b %d %Y";

/// Current conditions for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub location: String,
    /// Degrees Celsius, rounded.
    pub temperature: i64,
    pub description: String,
    /// Percent.
    pub humidity: u32,
    pub wind_speed: f64,
    /// hPa.
    pub pressure: u32,
    /// Kilometres.
    pub visibility: f64,
    pub uv_index: u32,
    pub forecast: Vec<WeatherForecast>,
}

/// One calendar day of forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub date: String,
    pub high: i64,
    pub low: i64,
    pub description: String,
    /// Millimetres of rain over the day.
    pub precipitation: f64,
}

/// A single 3-hour forecast interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// Unix seconds.
    pub timestamp: i64,
    pub temperature: f64,
    pub description: String,
    pub rain_3h: f64,
}

/// Group 3-hour samples into calendar days, keeping the first `days` days.
///
/// The day boundary is taken in `offset`, the provider's reporting zone.
/// Days keep the order in which they first appear.
pub fn group_forecast(
    samples: &[ForecastSample],
    offset: FixedOffset,
    days: usize,
) -> Vec<WeatherForecast> {
    let mut by_day: IndexMap<NaiveDate, Vec<&ForecastSample>> = IndexMap::new();

    for sample in samples {
        let Some(instant) = DateTime::from_timestamp(sample.timestamp, 0) else {
            continue;
        };
        let day = instant.with_timezone(&offset).date_naive();
        by_day.entry(day).or_default().push(sample);
    }

    by_day
        .into_iter()
        .take(days)
        .map(|(day, items)| {
            let high = items
                .iter()
                .map(|s| s.temperature)
                .fold(f64::NEG_INFINITY, f64::max);
            let low = items
                .iter()
                .map(|s| s.temperature)
                .fold(f64::INFINITY, f64::min);

            WeatherForecast {
                date: day.format(FORECAST_DATE).to_string(),
                high: high.round() as i64,
                low: low.round() as i64,
                description: items
                    .first()
                    .map(|s| s.description.clone())
                    .unwrap_or_default(),
                precipitation: items.iter().map(|s| s.rain_3h).sum(),
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    name: String,
    #[serde(default)]
    sys: OwmSys,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: OwmWind,
    #[serde(default)]
    visibility: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    #[serde(default)]
    humidity: u32,
    #[serde(default)]
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    #[serde(default)]
    list: Vec<OwmForecastItem>,
    city: Option<OwmCity>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    rain: Option<OwmRain>,
}

#[derive(Debug, Deserialize)]
struct OwmRain {
    #[serde(rename = "3h", default)]
    three_hours: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    /// Seconds east of UTC.
    #[serde(default)]
    timezone: i32,
}

fn first_description(conditions: &[OwmCondition]) -> String {
    conditions
        .first()
        .map(|c| c.description.clone())
        .unwrap_or_default()
}

/// Live weather lookups.
///
/// Both live calls fail with [`ToolError::ConfigurationMissing`] when no API
/// key is set. Callers decide whether to substitute [`WeatherLookup::mock`].
pub struct WeatherLookup {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherLookup {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            client: http_client(Some(timeout))?,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ToolsConfig) -> Result<Self, ToolError> {
        Self::new(
            config.openweather_key.clone(),
            config.openweather_url.clone(),
            config.upstream_timeout,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, ToolError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ToolError::ConfigurationMissing("OPENWEATHER_API_KEY".to_string()))
    }

    /// Current conditions for `location`.
    pub async fn current(&self, location: &str) -> Result<WeatherData, ToolError> {
        let key = self.api_key()?;
        let url = format!("{}/weather", self.base_url);

        debug!("Fetching current weather for '{}'", location);

        let body: OwmCurrent = self
            .client
            .get(&url)
            .query(&[("q", location), ("appid", key), ("units", "metric")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let location = if body.sys.country.is_empty() {
            body.name
        } else {
            format!("{}, {}", body.name, body.sys.country)
        };

        Ok(WeatherData {
            location,
            temperature: body.main.temp.round() as i64,
            description: first_description(&body.weather),
            humidity: body.main.humidity,
            wind_speed: body.wind.speed,
            pressure: body.main.pressure,
            visibility: body.visibility / 1000.0,
            uv_index: 0,
            forecast: Vec::new(),
        })
    }

    /// Daily forecast for up to `days` days, clamped to `1..=MAX_FORECAST_DAYS`.
    pub async fn forecast(
        &self,
        location: &str,
        days: usize,
    ) -> Result<Vec<WeatherForecast>, ToolError> {
        let key = self.api_key()?;
        let url = format!("{}/forecast", self.base_url);
        let days = days.clamp(1, MAX_FORECAST_DAYS);
        let count = days.saturating_mul(SAMPLES_PER_DAY).to_string();

        debug!("Fetching {}-day forecast for '{}'", days, location);

        let body: OwmForecast = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", key),
                ("units", "metric"),
                ("cnt", count.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let offset_secs = body.city.map(|c| c.timezone).unwrap_or(0);
        let offset = FixedOffset::east_opt(offset_secs)
            .ok_or_else(|| ToolError::Upstream(format!("bad UTC offset {}", offset_secs)))?;

        let samples: Vec<ForecastSample> = body
            .list
            .into_iter()
            .map(|item| ForecastSample {
                timestamp: item.dt,
                temperature: item.main.temp,
                description: first_description(&item.weather),
                rain_3h: item.rain.map(|r| r.three_hours).unwrap_or(0.0),
            })
            .collect();

        Ok(group_forecast(&samples, offset, days))
    }

    /// Fixed stand-in data. Only the location label follows the argument.
    pub fn mock(location: &str) -> WeatherData {
        WeatherData {
            location: location.to_string(),
            temperature: 22,
            description: "Partly cloudy".to_string(),
            humidity: 65,
            wind_speed: 5.2,
            pressure: 1013,
            visibility: 10.0,
            uv_index: 6,
            forecast: vec![WeatherForecast {
                date: Local::now().format(FORECAST_DATE).to_string(),
                high: 25,
                low: 18,
                description: "Sunny".to_string(),
                precipitation: 0.0,
            }],
        }
    }
}

/// Tool adapter for [`WeatherLookup`] that falls back to mock data.
pub struct WeatherTool {
    lookup: Arc<WeatherLookup>,
}

impl WeatherTool {
    pub fn new(lookup: Arc<WeatherLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get weather information for any location"
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let location = args
            .get_string_opt("location")
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let data = match self.lookup.current(&location).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Weather lookup failed, using mock data: {}", e);
                WeatherLookup::mock(&location)
            }
        };

        let content = format!(
            "Weather in {}: {}, {}°C. Humidity: {}%, Wind: {} km/h",
            data.location, data.description, data.temperature, data.humidity, data.wind_speed
        );

        Ok(ToolOutput::success(content).with_data(serde_json::to_value(&data)?))
    }
}
