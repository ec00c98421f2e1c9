//! Tool implementations.

mod ip;
mod search;
mod time;
mod weather;

use std::time::Duration;

use reqwest::Client;

use crate::error::ToolError;

pub use ip::{
    EchoService, GeoRecord, IpApiProvider, IpInfo, IpLocation, IpResolver, IpTool, IpType,
    NetworkInfo, SecurityFlags,
};
pub use search::{
    ContextualProvider, DuckDuckGoProvider, SearchHits, SearchOptions, SearchRequest,
    SearchResponse, SearchResult, SearchTool, SerpApiProvider, WebSearch, WikipediaProvider,
};
pub use time::{format_locale, time_info_at, FormattedTime, TimeClock, TimeInfo, TimeTool, TimeUnit};
pub use weather::{
    group_forecast, ForecastSample, WeatherData, WeatherForecast, WeatherLookup, WeatherTool,
    DEFAULT_LOCATION,
};

const USER_AGENT: &str = concat!("assistant-tools/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client for one tool. `None` leaves time bounds to the caller.
pub(crate) fn http_client(timeout: Option<Duration>) -> Result<Client, ToolError> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
