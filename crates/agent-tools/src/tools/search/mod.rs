//! Web search with tiered provider fallback.
//!
//! A search never fails. Tiers, in order:
//!
//! 1. [`SerpApiProvider`] (only when a SerpApi key is configured)
//! 2. [`DuckDuckGoProvider`] instant answers
//! 3. [`WikipediaProvider`] page summaries
//! 4. [`ContextualProvider`] keyword-triggered guidance
//!
//! If every tier fails, a single placeholder result is returned.

mod contextual;
mod providers;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ToolsConfig;
use crate::error::ToolError;
use crate::fallback::FallbackChain;
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::tools::http_client;

pub use contextual::ContextualProvider;
pub use providers::{DuckDuckGoProvider, SerpApiProvider, WikipediaProvider};

/// Results shown in a chat reply.
const CHAT_RESULT_LIMIT: usize = 3;

/// Options forwarded to the primary provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// `google`, `bing` or `duckduckgo`. Defaults to `google`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Result count. Defaults to 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A completed search.
///
/// `total_results` may be a provider estimate unrelated to `results.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total_results: u64,
    /// Milliseconds from the start of the call.
    pub search_time: u64,
    pub suggestions: Vec<String>,
}

/// Input to every search provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub options: SearchOptions,
}

/// What a provider found. Providers return an error rather than empty hits.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHits {
    pub results: Vec<SearchResult>,
    pub total_results: Option<u64>,
    pub suggestions: Vec<String>,
}

impl SearchHits {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            total_results: None,
            suggestions: Vec::new(),
        }
    }
}

fn templated_suggestions(query: &str) -> Vec<String> {
    vec![
        format!("{} tutorial", query),
        format!("{} guide", query),
        format!("{} examples", query),
    ]
}

fn placeholder_hits(query: &str) -> SearchHits {
    SearchHits {
        results: vec![SearchResult {
            title: format!("Search results for \"{}\"", query),
            url: "https://example.com".to_string(),
            snippet: "Search functionality is currently in development. \
                      Please configure a search API key for full functionality."
                .to_string(),
            source: "Local Assistant".to_string(),
            timestamp: Some(providers::now_stamp()),
        }],
        total_results: Some(1),
        suggestions: templated_suggestions(query),
    }
}

/// Web search over a provider chain.
pub struct WebSearch {
    chain: FallbackChain<SearchRequest, SearchHits>,
}

impl WebSearch {
    pub fn new(chain: FallbackChain<SearchRequest, SearchHits>) -> Self {
        Self { chain }
    }

    /// Build the standard tier list from configuration.
    pub fn from_config(config: &ToolsConfig) -> Result<Self, ToolError> {
        // Tiers are bounded by the chain, not the client.
        let client = http_client(None)?;
        let mut chain = FallbackChain::new("search", config.search_timeout);

        if let Some(ref key) = config.serpapi_key {
            chain = chain.with_provider(SerpApiProvider::new(
                client.clone(),
                config.serpapi_url.clone(),
                key.clone(),
                config.search_timeout,
            ));
        }

        let chain = chain
            .with_provider(DuckDuckGoProvider::new(
                client.clone(),
                config.duckduckgo_url.clone(),
                config.search_timeout,
            ))
            .with_provider(WikipediaProvider::new(
                client,
                config.wikipedia_url.clone(),
                config.summary_timeout,
            ))
            .with_provider(ContextualProvider);

        Ok(Self::new(chain))
    }

    /// Provider names in the order they are tried.
    pub fn providers(&self) -> Vec<&str> {
        self.chain.provider_names()
    }

    /// Search for `query`. Always yields at least one result.
    pub async fn search(&self, query: &str, options: SearchOptions) -> SearchResponse {
        let started = Instant::now();
        let request = SearchRequest {
            query: query.to_string(),
            options,
        };

        let hits = match self.chain.run(&request).await {
            Ok(resolved) => {
                debug!(
                    "Search for '{}' answered by {} ({} results)",
                    query,
                    resolved.provider,
                    resolved.value.results.len()
                );
                resolved.value
            }
            Err(e) => {
                warn!("Search for '{}' fell back to placeholder: {}", query, e);
                placeholder_hits(query)
            }
        };

        let total_results = hits.total_results.unwrap_or(hits.results.len() as u64);

        SearchResponse {
            query: query.to_string(),
            results: hits.results,
            total_results,
            search_time: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            suggestions: hits.suggestions,
        }
    }

    /// News-oriented search.
    pub async fn search_news(&self, query: &str, options: SearchOptions) -> SearchResponse {
        let options = SearchOptions {
            engine: Some("google".to_string()),
            ..options
        };
        self.search(&format!("{} news", query), options).await
    }

    /// Image-oriented search.
    pub async fn search_images(&self, query: &str, options: SearchOptions) -> SearchResponse {
        let options = SearchOptions {
            engine: Some("google".to_string()),
            ..options
        };
        self.search(&format!("{} images", query), options).await
    }
}

/// Render the top results as a chat reply.
fn chat_summary(response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return format!(
            "I searched for \"{}\" but didn't find specific results. \
             You might want to try a different search term.",
            response.query
        );
    }

    let lines: Vec<String> = response
        .results
        .iter()
        .take(CHAT_RESULT_LIMIT)
        .enumerate()
        .map(|(i, r)| format!("{}. {}\n{}\nSource: {}", i + 1, r.title, r.snippet, r.url))
        .collect();

    format!(
        "Search results for \"{}\":\n\n{}",
        response.query,
        lines.join("\n\n")
    )
}

/// Tool adapter for [`WebSearch`].
pub struct SearchTool {
    search: Arc<WebSearch>,
}

impl SearchTool {
    pub fn new(search: Arc<WebSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web for information"
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let Some(query) = args
            .get_string_opt("query")
            .or_else(|| args.get_string_opt("q"))
        else {
            return Ok(ToolOutput::failure("Please provide a search query."));
        };

        let response = self.search.search(&query, SearchOptions::default()).await;
        let content = chat_summary(&response);
        Ok(ToolOutput::success(content).with_data(serde_json::to_value(&response)?))
    }
}
