//! Chat endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::timestamp;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub source: &'static str,
    pub tools_used: Vec<String>,
    pub timestamp: String,
}

/// Liveness banner for the chat endpoint.
pub async fn status() -> Json<Value> {
    Json(json!({
        "status": "AI Assistant API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": timestamp(),
    }))
}

/// Answer `{message}` through the chat responder.
///
/// A body without a non-empty string `message` gets a 400 in the chat shape
/// (`{message, source: "error", timestamp}`) rather than the tool error shape.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let message = match payload {
        Ok(Json(body)) => body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(String::from),
        Err(rejection) => {
            warn!("Rejected chat body: {}", rejection.body_text());
            None
        }
    };

    let Some(message) = message else {
        let body = json!({
            "message": "Please provide a valid message.",
            "source": "error",
            "timestamp": timestamp(),
        });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    let reply = state.responder.respond(&message).await;
    info!(
        "Chat reply: source={}, {} chars",
        reply.source.as_str(),
        reply.content.len()
    );

    Json(ChatResponse {
        message: reply.content,
        source: reply.source.as_str(),
        tools_used: reply.tools_used,
        timestamp: timestamp(),
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agent_tools::{Toolkit, ToolsConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use mock_brain::EchoBrain;
    use orchestrator::{ChatResponder, FALLBACK_REPLIES};
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::routes::test_support::*;
    use crate::state::AppState;

    #[tokio::test]
    async fn test_status() {
        let response = offline_app().oneshot(get("/api/chat")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "AI Assistant API is running");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_rejects_missing_message() {
        for body in [json!({}), json!({"message": 42}), json!({"message": ""})] {
            let response = offline_app()
                .oneshot(post_json("/api/chat", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body = body_json(response).await;
            assert_eq!(body["message"], "Please provide a valid message.");
            assert_eq!(body["source"], "error");
        }
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = offline_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["source"], "error");
    }

    #[tokio::test]
    async fn test_time_message_uses_tool() {
        let response = offline_app()
            .oneshot(post_json("/api/chat", json!({"message": "What time is it?"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["source"], "tool");
        assert_eq!(body["toolsUsed"], json!(["time"]));
        assert!(body["message"].as_str().unwrap().starts_with("Current time: "));
    }

    #[tokio::test]
    async fn test_weather_message_uses_mock_without_key() {
        let response = offline_app()
            .oneshot(post_json("/api/chat", json!({"message": "weather in Paris"})))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["source"], "tool");
        assert_eq!(
            body["message"],
            "Weather in Paris: Partly cloudy, 22°C. Humidity: 65%, Wind: 5.2 km/h"
        );
    }

    #[tokio::test]
    async fn test_unmatched_message_falls_back() {
        let response = offline_app()
            .oneshot(post_json("/api/chat", json!({"message": "hello there"})))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["toolsUsed"], json!([]));
        assert!(FALLBACK_REPLIES.contains(&body["message"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn test_unmatched_message_uses_model() {
        let toolkit = Toolkit::from_config(&offline_config()).unwrap();
        let responder = ChatResponder::new(toolkit.registry())
            .with_brain(Arc::new(EchoBrain::with_prefix("model says: ")));
        let app = app(AppState::new(toolkit, responder, false));

        let response = app
            .oneshot(post_json("/api/chat", json!({"message": "hello there"})))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["source"], "model");
        assert_eq!(body["message"], "model says: hello there");
    }

    #[tokio::test]
    async fn test_whats_my_ip_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/echo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ip": "203.0.113.7"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/203.0.113.7/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "country_name": "Japan",
                "region": "Tokyo",
                "city": "Shibuya",
                "latitude": 35.66,
                "longitude": 139.7,
                "timezone": "Asia/Tokyo",
                "org": "Example Net",
                "asn": "AS64500"
            })))
            .mount(&server)
            .await;

        let config = ToolsConfig {
            ip_echo_urls: vec![format!("{}/echo", server.uri())],
            ip_geo_url: server.uri(),
            ..offline_config()
        };
        let app = app(state_with(&config, false));

        let response = app
            .oneshot(post_json("/api/chat", json!({"message": "what's my ip"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["source"], "tool");
        assert_eq!(body["toolsUsed"], json!(["ip"]));
        assert_eq!(
            body["message"],
            "Your IP information: 203.0.113.7 (Shibuya, Tokyo, Japan)"
        );
    }
}
