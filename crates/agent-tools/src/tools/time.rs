//! Clock tool rendering in a configured IANA zone.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ToolsConfig;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// en-US style `M/D/YYYY, h:mm:ss AM`.
const LOCALE_DATETIME: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
const LOCALE_DATE: &str = "%-m/%-d/%Y";
const LOCALE_TIME: &str = "%-I:%M:%S %p";
/// `Monday, January 15, 2024 at 02:30:45 PM UTC`.
const LONG_DATETIME: &str = "%A, %B %-d, %Y at %I:%M:%S %p %Z";

/// A snapshot of the current time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInfo {
    pub current: String,
    pub timezone: String,
    /// RFC 3339 in UTC with millisecond precision.
    pub utc: String,
    /// Unix time in milliseconds.
    pub timestamp: i64,
    pub formatted: FormattedTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedTime {
    pub date: String,
    pub time: String,
    pub full: String,
}

/// Build a [`TimeInfo`] for a given instant.
pub fn time_info_at<Z>(now: &DateTime<Z>, timezone: &str) -> TimeInfo
where
    Z: TimeZone,
    Z::Offset: Display,
{
    TimeInfo {
        current: now.format(LOCALE_DATETIME).to_string(),
        timezone: timezone.to_string(),
        utc: now
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        timestamp: now.timestamp_millis(),
        formatted: FormattedTime {
            date: now.format(LOCALE_DATE).to_string(),
            time: now.format(LOCALE_TIME).to_string(),
            full: now.format(LONG_DATETIME).to_string(),
        },
    }
}

/// Units accepted by [`TimeClock::add_time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    fn millis(&self) -> f64 {
        match self {
            TimeUnit::Minutes => 60_000.0,
            TimeUnit::Hours => 3_600_000.0,
            TimeUnit::Days => 86_400_000.0,
            TimeUnit::Weeks => 604_800_000.0,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "hour" | "hours" => Ok(TimeUnit::Hours),
            "day" | "days" => Ok(TimeUnit::Days),
            "week" | "weeks" => Ok(TimeUnit::Weeks),
            _ => Err(ToolError::invalid(
                "unit",
                "expected minutes, hours, days or weeks",
            )),
        }
    }
}

/// Reads the system clock and renders it in one IANA zone. Performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct TimeClock {
    zone: Tz,
}

impl TimeClock {
    /// Create a clock for the IANA zone `timezone`.
    ///
    /// An unknown name falls back to UTC, so the reported zone is always the
    /// one the times are rendered in.
    pub fn new(timezone: &str) -> Self {
        let zone = timezone.parse::<Tz>().unwrap_or_else(|_| {
            warn!("Unknown timezone '{}', using UTC", timezone);
            Tz::UTC
        });
        Self { zone }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(&config.timezone)
    }

    pub fn current_time(&self) -> TimeInfo {
        self.time_info(Utc::now())
    }

    /// Snapshot of `instant` in this clock's zone.
    pub fn time_info(&self, instant: DateTime<Utc>) -> TimeInfo {
        time_info_at(&instant.with_timezone(&self.zone), self.zone.name())
    }

    /// IANA name of the zone times are rendered in.
    pub fn timezone(&self) -> String {
        self.zone.name().to_string()
    }

    /// The current time shifted by `amount` units. `None` if out of range.
    pub fn add_time(&self, amount: f64, unit: TimeUnit) -> Option<DateTime<Tz>> {
        shift(Utc::now().with_timezone(&self.zone), amount, unit)
    }

    /// Render a Unix millisecond timestamp in this clock's zone. `None` if out of range.
    pub fn format_time(&self, timestamp_ms: i64) -> Option<String> {
        DateTime::from_timestamp_millis(timestamp_ms)
            .map(|dt| format_locale(&dt.with_timezone(&self.zone)))
    }
}

/// Render an instant in the en-US locale style used across the tool.
pub fn format_locale<Z>(dt: &DateTime<Z>) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    dt.format(LOCALE_DATETIME).to_string()
}

fn shift<Z: TimeZone>(from: DateTime<Z>, amount: f64, unit: TimeUnit) -> Option<DateTime<Z>> {
    let millis = amount * unit.millis();
    if !millis.is_finite() {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(millis.round() as i64)?;
    from.checked_add_signed(delta)
}

/// Tool adapter for [`TimeClock`].
pub struct TimeTool {
    clock: Arc<TimeClock>,
}

impl TimeTool {
    pub fn new(clock: Arc<TimeClock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl Tool for TimeTool {
    fn name(&self) -> &str {
        "time"
    }

    fn description(&self) -> &str {
        "Get current time and date information"
    }

    async fn execute(&self, _args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let info = self.clock.current_time();
        let content = format!("Current time: {}", info.formatted.full);
        Ok(ToolOutput::success(content).with_data(serde_json::to_value(&info)?))
    }
}
