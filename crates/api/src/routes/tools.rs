//! Tool listing and generic dispatch.

use std::collections::HashMap;

use agent_tools::ToolOutput;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ok, Envelope};
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub tool: Option<String>,
    pub action: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResult {
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub result: ToolOutput,
}

/// List registered tools.
pub async fn list(State(state): State<AppState>) -> Json<Envelope<Vec<ToolInfo>>> {
    let tools = state
        .registry
        .get_descriptions()
        .into_iter()
        .map(|(name, description)| ToolInfo {
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect();
    ok(tools)
}

/// Run `{tool, parameters}` through the registry.
pub async fn execute(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Json<Envelope<ExecuteResult>>> {
    let Json(request) = payload?;

    let tool = request
        .tool
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Tool is required"))?;

    let result = state
        .registry
        .execute(&tool, request.parameters)
        .await
        .map_err(|e| state.tool_error(e))?;

    Ok(ok(ExecuteResult {
        tool,
        action: request.action,
        result,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::test_support::*;

    #[tokio::test]
    async fn test_list_tools() {
        let response = offline_app().oneshot(get("/api/tools")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["ip", "search", "time", "weather"]);
    }

    #[tokio::test]
    async fn test_execute_time() {
        let response = offline_app()
            .oneshot(post_json("/api/tools", json!({"tool": "time", "action": "current"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["tool"], "time");
        assert_eq!(body["data"]["action"], "current");
        assert_eq!(body["data"]["result"]["success"], true);
        assert!(body["data"]["result"]["data"]["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn test_execute_weather_params() {
        let response = offline_app()
            .oneshot(post_json(
                "/api/tools",
                json!({"tool": "weather", "parameters": {"location": "Tokyo"}}),
            ))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["data"]["result"]["data"]["location"], "Tokyo");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_bad_request() {
        let response = offline_app()
            .oneshot(post_json("/api/tools", json!({"tool": "calculator"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("calculator"));
    }

    #[tokio::test]
    async fn test_missing_tool_is_bad_request() {
        let response = offline_app()
            .oneshot(post_json("/api/tools", json!({"parameters": {}})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Tool is required");
    }
}
