//! Network-backed search providers.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{SearchHits, SearchRequest, SearchResult};
use crate::error::ToolError;
use crate::fallback::Provider;

/// Related topics taken from an instant answer.
const DDG_TOPIC_LIMIT: usize = 5;

pub(crate) fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// SerpApi

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SerpOrganic>,
    search_information: Option<SerpInformation>,
    #[serde(default)]
    related_searches: Vec<SerpRelated>,
}

#[derive(Debug, Deserialize)]
struct SerpOrganic {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpInformation {
    total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SerpRelated {
    query: Option<String>,
}

/// Paid primary tier. Only added to the chain when a key is configured.
pub struct SerpApiProvider {
    client: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl SerpApiProvider {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Provider<SearchRequest, SearchHits> for SerpApiProvider {
    fn name(&self) -> &str {
        "serpapi"
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn attempt(&self, request: &SearchRequest) -> Result<SearchHits, ToolError> {
        let options = &request.options;
        let mut params: Vec<(&str, String)> = vec![
            ("q", request.query.clone()),
            ("api_key", self.api_key.clone()),
            (
                "engine",
                options.engine.clone().unwrap_or_else(|| "google".to_string()),
            ),
            ("num", options.num.unwrap_or(10).to_string()),
        ];
        if let Some(ref location) = options.location {
            params.push(("location", location.clone()));
        }
        if let Some(ref language) = options.language {
            params.push(("hl", language.clone()));
        }

        debug!("SerpApi search for '{}'", request.query);

        let body: SerpApiResponse = self
            .client
            .get(&self.url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if body.organic_results.is_empty() {
            return Err(ToolError::Upstream("SerpApi returned no organic results".into()));
        }

        let results: Vec<SearchResult> = body
            .organic_results
            .into_iter()
            .map(|r| SearchResult {
                source: Url::parse(&r.link)
                    .ok()
                    .and_then(|u| u.host_str().map(String::from))
                    .unwrap_or_default(),
                title: r.title,
                url: r.link,
                snippet: r.snippet,
                timestamp: r.date,
            })
            .collect();

        Ok(SearchHits {
            total_results: body.search_information.and_then(|s| s.total_results),
            suggestions: body
                .related_searches
                .into_iter()
                .filter_map(|s| s.query)
                .collect(),
            results,
        })
    }
}

// DuckDuckGo

#[derive(Debug, Deserialize)]
struct DdgResponse {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<DdgTopic>,
}

/// Grouped topics carry `Name`/`Topics` instead and are skipped.
#[derive(Debug, Deserialize)]
struct DdgTopic {
    #[serde(rename = "Text")]
    text: Option<String>,
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
}

/// Free instant-answer tier.
pub struct DuckDuckGoProvider {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl DuckDuckGoProvider {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl Provider<SearchRequest, SearchHits> for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn attempt(&self, request: &SearchRequest) -> Result<SearchHits, ToolError> {
        let url = format!("{}/", self.base_url);

        let body: DdgResponse = self
            .client
            .get(&url)
            .query(&[
                ("q", request.query.as_str()),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let stamp = now_stamp();
        let mut results = Vec::new();

        if !body.abstract_text.is_empty() {
            results.push(SearchResult {
                title: if body.heading.is_empty() {
                    request.query.clone()
                } else {
                    body.heading
                },
                url: body.abstract_url,
                snippet: body.abstract_text,
                source: "DuckDuckGo".to_string(),
                timestamp: Some(stamp.clone()),
            });
        }

        for topic in body.related_topics.into_iter().take(DDG_TOPIC_LIMIT) {
            let (Some(text), Some(first_url)) = (topic.text, topic.first_url) else {
                continue;
            };
            if text.is_empty() || first_url.is_empty() {
                continue;
            }
            results.push(SearchResult {
                title: text.split(" - ").next().unwrap_or(&text).to_string(),
                url: first_url,
                snippet: text,
                source: "DuckDuckGo".to_string(),
                timestamp: Some(stamp.clone()),
            });
        }

        if results.is_empty() {
            return Err(ToolError::Upstream("DuckDuckGo had no instant answer".into()));
        }

        Ok(SearchHits::new(results))
    }
}

// Wikipedia

#[derive(Debug, Deserialize)]
struct WikiSummary {
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
    content_urls: Option<WikiContentUrls>,
}

#[derive(Debug, Deserialize)]
struct WikiContentUrls {
    desktop: Option<WikiPage>,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    page: String,
}

/// Encyclopedia summary tier, keyed by the raw query.
pub struct WikipediaProvider {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl WikipediaProvider {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    fn summary_url(&self, query: &str) -> Result<Url, ToolError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ToolError::Upstream(format!("invalid Wikipedia URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ToolError::Upstream("Wikipedia URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(["page", "summary", query]);
        Ok(url)
    }
}

#[async_trait]
impl Provider<SearchRequest, SearchHits> for WikipediaProvider {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn attempt(&self, request: &SearchRequest) -> Result<SearchHits, ToolError> {
        let url = self.summary_url(&request.query)?;

        let body: WikiSummary = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if body.extract.is_empty() {
            return Err(ToolError::Upstream("Wikipedia summary had no extract".into()));
        }

        let mut hits = SearchHits::new(vec![SearchResult {
            title: body.title,
            url: body
                .content_urls
                .and_then(|u| u.desktop)
                .map(|d| d.page)
                .unwrap_or_default(),
            snippet: body.extract,
            source: "Wikipedia".to_string(),
            timestamp: Some(now_stamp()),
        }]);
        hits.total_results = Some(1);
        Ok(hits)
    }
}
