//! Keyword intent classification.
//!
//! Messages are matched against an ordered rule table. Each rule pairs a set
//! of trigger keywords with an extractor that pulls the tool parameters out of
//! the message text. The first rule with a matching keyword wins, so a
//! message mentioning both "weather" and "search" resolves to weather.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Location used when a weather message names none.
pub const DEFAULT_WEATHER_LOCATION: &str = "New York";

static WEATHER_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)weather (?:in |for )?([a-zA-Z\s]+)").expect("valid weather pattern")
});

static TEMPERATURE_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)temperature (?:in |for )?([a-zA-Z\s]+)").expect("valid temperature pattern")
});

static SEARCH_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:search|find|look up) (?:for )?(.+)").expect("valid search pattern")
});

/// Tools an intent can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolName {
    Time,
    Weather,
    Search,
    Ip,
}

impl ToolName {
    /// Registry name of the tool.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Time => "time",
            ToolName::Weather => "weather",
            ToolName::Search => "search",
            ToolName::Ip => "ip",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified message: which tool to run and with what parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolIntent {
    pub tool: ToolName,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl ToolIntent {
    /// An intent with no parameters.
    pub fn bare(tool: ToolName) -> Self {
        Self {
            tool,
            parameters: HashMap::new(),
        }
    }

    /// An intent with a single parameter.
    pub fn with_param(tool: ToolName, key: &str, value: impl Into<String>) -> Self {
        let mut parameters = HashMap::new();
        parameters.insert(key.to_string(), value.into());
        Self { tool, parameters }
    }

    /// Look up a parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

/// Builds the intent for a message that matched a rule's keywords.
pub type Extractor = fn(&str) -> ToolIntent;

/// One row of the routing table.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub tool: ToolName,
    pub keywords: Vec<&'static str>,
    pub extract: Extractor,
}

impl IntentRule {
    pub fn new(tool: ToolName, keywords: &[&'static str], extract: Extractor) -> Self {
        Self {
            tool,
            keywords: keywords.to_vec(),
            extract,
        }
    }

    /// Whether the lower-cased message contains any trigger keyword.
    fn matches(&self, lower: &str) -> bool {
        self.keywords.iter().any(|k| lower.contains(k))
    }
}

fn time_intent(_message: &str) -> ToolIntent {
    ToolIntent::bare(ToolName::Time)
}

fn weather_intent(message: &str) -> ToolIntent {
    let location = [&*WEATHER_LOCATION, &*TEMPERATURE_LOCATION]
        .iter()
        .find_map(|re| re.captures(message))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|loc| !loc.is_empty())
        .unwrap_or(DEFAULT_WEATHER_LOCATION);

    ToolIntent::with_param(ToolName::Weather, "location", location)
}

fn search_intent(message: &str) -> ToolIntent {
    let query = SEARCH_QUERY
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|q| !q.is_empty())
        .unwrap_or(message);

    ToolIntent::with_param(ToolName::Search, "query", query)
}

fn ip_intent(_message: &str) -> ToolIntent {
    ToolIntent::bare(ToolName::Ip)
}

/// Routes free-text messages to at most one tool.
#[derive(Debug, Clone)]
pub struct IntentRouter {
    rules: Vec<IntentRule>,
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self {
            rules: vec![
                IntentRule::new(ToolName::Time, &["time", "clock", "what time"], time_intent),
                IntentRule::new(
                    ToolName::Weather,
                    &["weather", "temperature", "forecast"],
                    weather_intent,
                ),
                IntentRule::new(ToolName::Search, &["search", "find", "look up"], search_intent),
                IntentRule::new(ToolName::Ip, &["ip", "my ip", "ip address"], ip_intent),
            ],
        }
    }
}

impl IntentRouter {
    /// Router with the built-in time, weather, search and ip rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. It is checked after every existing rule.
    pub fn with_rule(mut self, rule: IntentRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The rules in priority order.
    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Classify a message. `None` means no tool applies.
    pub fn classify(&self, message: &str) -> Option<ToolIntent> {
        let lower = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map(|rule| (rule.extract)(message))
    }
}
