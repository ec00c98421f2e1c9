//! Provider configuration for the tools.

use std::env;
use std::time::Duration;

/// Default SerpApi endpoint.
pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com/search";

/// Default DuckDuckGo Instant Answer endpoint.
pub const DEFAULT_DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com";

/// Default Wikipedia REST endpoint.
pub const DEFAULT_WIKIPEDIA_URL: &str = "https://en.wikipedia.org/api/rest_v1";

/// Default OpenWeatherMap endpoint.
pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Default IP geolocation endpoint.
pub const DEFAULT_IP_GEO_URL: &str = "https://ipapi.co";

/// Default public-IP echo services, tried in order.
pub const DEFAULT_IP_ECHO_URLS: &[&str] = &[
    "https://api.ipify.org?format=json",
    "https://ipapi.co/json/",
    "https://httpbin.org/ip",
];

/// Endpoints, keys and time bounds for every tool.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// SerpApi key. Without it the primary search tier is skipped.
    pub serpapi_key: Option<String>,
    pub serpapi_url: String,
    pub duckduckgo_url: String,
    pub wikipedia_url: String,
    /// Bound on the SerpApi and DuckDuckGo tiers.
    pub search_timeout: Duration,
    /// Bound on the Wikipedia tier.
    pub summary_timeout: Duration,

    /// OpenWeatherMap key. Without it live weather calls fail.
    pub openweather_key: Option<String>,
    pub openweather_url: String,

    pub ip_echo_urls: Vec<String>,
    pub ip_geo_url: String,
    pub ip_cache_ttl: Duration,

    /// Bound on weather and IP calls.
    pub upstream_timeout: Duration,

    /// IANA timezone name reported by the clock.
    pub timezone: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            serpapi_key: None,
            serpapi_url: DEFAULT_SERPAPI_URL.to_string(),
            duckduckgo_url: DEFAULT_DUCKDUCKGO_URL.to_string(),
            wikipedia_url: DEFAULT_WIKIPEDIA_URL.to_string(),
            search_timeout: Duration::from_secs(10),
            summary_timeout: Duration::from_secs(8),
            openweather_key: None,
            openweather_url: DEFAULT_OPENWEATHER_URL.to_string(),
            ip_echo_urls: DEFAULT_IP_ECHO_URLS.iter().map(|s| s.to_string()).collect(),
            ip_geo_url: DEFAULT_IP_GEO_URL.to_string(),
            ip_cache_ttl: Duration::from_secs(300),
            upstream_timeout: Duration::from_secs(10),
            timezone: "UTC".to_string(),
        }
    }
}

impl ToolsConfig {
    /// Create configuration from environment variables.
    ///
    /// Every variable is optional; unset or unparsable values keep their
    /// defaults.
    ///
    /// - `SERPAPI_API_KEY`, `SERPAPI_URL`
    /// - `DUCKDUCKGO_URL`, `WIKIPEDIA_URL`
    /// - `SEARCH_TIMEOUT_SECS` (default: 10), `SUMMARY_TIMEOUT_SECS` (default: 8)
    /// - `OPENWEATHER_API_KEY`, `OPENWEATHER_URL`
    /// - `IP_ECHO_URLS` (comma-separated), `IP_GEO_URL`
    /// - `IP_CACHE_TTL_SECS` (default: 300)
    /// - `UPSTREAM_TIMEOUT_SECS` (default: 10)
    /// - `ASSISTANT_TIMEZONE`, then `TZ` (default: UTC)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.serpapi_key = non_empty_var("SERPAPI_API_KEY");
        if let Some(url) = non_empty_var("SERPAPI_URL") {
            config.serpapi_url = url;
        }
        if let Some(url) = non_empty_var("DUCKDUCKGO_URL") {
            config.duckduckgo_url = url;
        }
        if let Some(url) = non_empty_var("WIKIPEDIA_URL") {
            config.wikipedia_url = url;
        }
        if let Some(timeout) = secs_var("SEARCH_TIMEOUT_SECS") {
            config.search_timeout = timeout;
        }
        if let Some(timeout) = secs_var("SUMMARY_TIMEOUT_SECS") {
            config.summary_timeout = timeout;
        }

        config.openweather_key = non_empty_var("OPENWEATHER_API_KEY");
        if let Some(url) = non_empty_var("OPENWEATHER_URL") {
            config.openweather_url = url;
        }

        if let Some(urls) = non_empty_var("IP_ECHO_URLS") {
            let parsed: Vec<String> = urls
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.ip_echo_urls = parsed;
            }
        }
        if let Some(url) = non_empty_var("IP_GEO_URL") {
            config.ip_geo_url = url;
        }
        if let Some(ttl) = secs_var("IP_CACHE_TTL_SECS") {
            config.ip_cache_ttl = ttl;
        }
        if let Some(timeout) = secs_var("UPSTREAM_TIMEOUT_SECS") {
            config.upstream_timeout = timeout;
        }

        if let Some(tz) = non_empty_var("ASSISTANT_TIMEZONE").or_else(|| non_empty_var("TZ")) {
            config.timezone = tz;
        }

        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secs_var(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
