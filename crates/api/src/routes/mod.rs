//! Route handlers for the assistant API.

pub mod chat;
pub mod health;
pub mod ip;
pub mod search;
pub mod time;
pub mod tools;
pub mod weather;

use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Chat
        .route("/api/chat", get(chat::status).post(chat::chat))
        // Tools
        .route("/api/tools", get(tools::list).post(tools::execute))
        .route("/api/tools/search", get(search::search_get).post(search::search_post))
        .route("/api/tools/ip", get(ip::ip_get).post(ip::ip_post))
        .route("/api/tools/weather", get(weather::weather_get).post(weather::weather_post))
        .route("/api/tools/time", get(time::time_get).post(time::time_post))
}

/// Success body shared by every tool endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: String,
}

/// Wrap `data` in a success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
        timestamp: timestamp(),
    })
}

/// Current UTC time as ISO 8601 with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use agent_tools::{Toolkit, ToolsConfig};
    use axum::body::Body;
    use axum::http::{Request, Response};
    use axum::Router;
    use orchestrator::ChatResponder;
    use serde_json::Value;

    use crate::state::AppState;

    /// Nothing listens here, so every upstream call fails fast.
    pub const DEAD_UPSTREAM: &str = "http://127.0.0.1:9";

    /// Tool configuration with every upstream pointed at [`DEAD_UPSTREAM`].
    pub fn offline_config() -> ToolsConfig {
        ToolsConfig {
            serpapi_key: None,
            duckduckgo_url: DEAD_UPSTREAM.to_string(),
            wikipedia_url: DEAD_UPSTREAM.to_string(),
            search_timeout: Duration::from_secs(2),
            summary_timeout: Duration::from_secs(2),
            openweather_key: None,
            ip_echo_urls: vec![DEAD_UPSTREAM.to_string()],
            ip_geo_url: DEAD_UPSTREAM.to_string(),
            upstream_timeout: Duration::from_secs(2),
            ..ToolsConfig::default()
        }
    }

    pub fn state_with(config: &ToolsConfig, expose_errors: bool) -> AppState {
        let toolkit = Toolkit::from_config(config).unwrap();
        let responder = ChatResponder::new(toolkit.registry());
        AppState::new(toolkit, responder, expose_errors)
    }

    pub fn app(state: AppState) -> Router {
        super::router().with_state(state)
    }

    pub fn offline_app() -> Router {
        app(state_with(&offline_config(), false))
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
