//! Time, weather, search and IP tools for the assistant.
//!
//! Each data source is a plain component with its own typed API, plus a thin
//! [`Tool`] adapter so the components can be dispatched by name through a
//! [`ToolRegistry`].
//!
//! # Components
//!
//! - [`TimeClock`] - time snapshots in a configured IANA zone, offsets and formatting. No I/O.
//! - [`WeatherLookup`] - OpenWeatherMap current conditions and daily forecast,
//!   plus a fixed [`WeatherLookup::mock`] record for callers to fall back on.
//! - [`WebSearch`] - SerpApi, DuckDuckGo, Wikipedia, then offline guidance.
//!   Never fails.
//! - [`IpResolver`] - public IP via echo services, geolocation behind a
//!   [`TtlCache`], and IPv4/IPv6 validation.
//!
//! Network-backed components reach their upstreams through a
//! [`FallbackChain`] of [`Provider`]s, which bounds each attempt with a
//! timeout and moves on at the first failure.
//!
//! # Example
//!
//! ```rust,no_run
//! use agent_tools::{Toolkit, ToolsConfig};
//! use std::collections::HashMap;
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() {
//!     let toolkit = Toolkit::from_config(&ToolsConfig::from_env()).unwrap();
//!     let registry = toolkit.registry();
//!
//!     let mut params = HashMap::new();
//!     params.insert("location".to_string(), Value::String("Paris".to_string()));
//!
//!     let result = registry.execute("weather", params).await.unwrap();
//!     println!("{}", result.content);
//! }
//! ```

mod cache;
mod config;
mod error;
mod fallback;
mod registry;
mod tool;
pub mod tools;

use std::sync::Arc;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache, DEFAULT_MAX_CACHE_ENTRIES};
pub use config::ToolsConfig;
pub use error::ToolError;
pub use fallback::{FallbackChain, Provider, Resolved};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgs, ToolOutput};
pub use tools::{
    IpInfo, IpResolver, IpTool, NetworkInfo, SearchOptions, SearchResponse, SearchResult,
    SearchTool, TimeClock, TimeInfo, TimeTool, TimeUnit, WeatherData, WeatherForecast,
    WeatherLookup, WeatherTool, WebSearch,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// The four shared components, built once per process.
#[derive(Clone)]
pub struct Toolkit {
    pub clock: Arc<TimeClock>,
    pub weather: Arc<WeatherLookup>,
    pub search: Arc<WebSearch>,
    pub ip: Arc<IpResolver>,
}

impl Toolkit {
    /// Build every component from configuration.
    pub fn from_config(config: &ToolsConfig) -> Result<Self, ToolError> {
        Ok(Self {
            clock: Arc::new(TimeClock::from_config(config)),
            weather: Arc::new(WeatherLookup::from_config(config)?),
            search: Arc::new(WebSearch::from_config(config)?),
            ip: Arc::new(IpResolver::from_config(config)?),
        })
    }

    /// A registry with the `time`, `weather`, `search` and `ip` tools.
    pub fn registry(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(TimeTool::new(self.clock.clone()));
        registry.register(WeatherTool::new(self.weather.clone()));
        registry.register(SearchTool::new(self.search.clone()));
        registry.register(IpTool::new(self.ip.clone()));
        registry
    }
}
