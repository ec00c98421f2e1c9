//! Offline tier: keyword-triggered guidance results.

use async_trait::async_trait;
use chrono::Local;
use url::Url;

use super::providers::now_stamp;
use super::{templated_suggestions, SearchHits, SearchRequest, SearchResult};
use crate::error::ToolError;
use crate::fallback::Provider;
use crate::tools::time::format_locale;

type Builder = fn(&str) -> SearchResult;

/// Checked in order; the first bucket with a matching keyword wins.
const BUCKETS: &[(&[&str], Builder)] = &[
    (&["time", "date", "today"], time_result),
    (&["weather", "temperature", "forecast"], weather_result),
    (&["programming", "code", "javascript", "python"], programming_result),
    (&["news", "latest", "current events"], news_result),
];

fn result(title: String, url: String, snippet: String, source: &str) -> SearchResult {
    SearchResult {
        title,
        url,
        snippet,
        source: source.to_string(),
        timestamp: Some(now_stamp()),
    }
}

fn time_result(_query: &str) -> SearchResult {
    result(
        "Current Time and Date Information".into(),
        "https://time.is".into(),
        format!(
            "Current time: {}. For more precise time information, use the time tool in this assistant.",
            format_locale(&Local::now())
        ),
        "Time Service",
    )
}

fn weather_result(_query: &str) -> SearchResult {
    result(
        "Weather Information".into(),
        "https://weather.com".into(),
        "For current weather information, use the weather tool in this assistant. \
         Provide a location to get real-time weather data."
            .into(),
        "Weather Service",
    )
}

fn programming_result(_query: &str) -> SearchResult {
    result(
        "Programming and Development Resources".into(),
        "https://developer.mozilla.org".into(),
        "Find comprehensive programming documentation, tutorials, and examples. \
         This assistant can also help with code questions directly."
            .into(),
        "Developer Resources",
    )
}

fn news_result(_query: &str) -> SearchResult {
    result(
        "Latest News and Current Events".into(),
        "https://news.google.com".into(),
        "For the most current news, visit major news websites. Note: This assistant \
         provides general information but may not have the very latest breaking news."
            .into(),
        "News Aggregator",
    )
}

fn generic_result(query: &str) -> SearchResult {
    let url = Url::parse_with_params("https://duckduckgo.com/", &[("q", query)])
        .map(String::from)
        .unwrap_or_else(|_| "https://duckduckgo.com/".to_string());

    result(
        format!("Search Results for \"{}\"", query),
        url,
        "For comprehensive web search results, try searching on DuckDuckGo, Google, or \
         other search engines. This assistant can help answer questions directly."
            .into(),
        "Search Guidance",
    )
}

/// Pick the guidance result for `query`.
pub fn contextual_result(query: &str) -> SearchResult {
    let lower = query.to_lowercase();
    BUCKETS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, build)| build(query))
        .unwrap_or_else(|| generic_result(query))
}

/// Synthesizes a guidance result without any network access. Never fails.
pub struct ContextualProvider;

#[async_trait]
impl Provider<SearchRequest, SearchHits> for ContextualProvider {
    fn name(&self) -> &str {
        "contextual"
    }

    async fn attempt(&self, request: &SearchRequest) -> Result<SearchHits, ToolError> {
        let mut hits = SearchHits::new(vec![contextual_result(&request.query)]);
        hits.suggestions = templated_suggestions(&request.query);
        Ok(hits)
    }
}
