//! Search endpoint.

use agent_tools::{SearchOptions, SearchResponse};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::{ok, Envelope};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Engine requested by `GET` when the caller names none.
const DEFAULT_GET_ENGINE: &str = "duckduckgo";
const DEFAULT_GET_NUM: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub query: Option<String>,
    pub engine: Option<String>,
    pub num: Option<u32>,
    pub location: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub query: Option<String>,
    pub q: Option<String>,
    pub action: Option<String>,
    #[serde(default)]
    pub options: SearchOptions,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `GET ?q=` or `?query=`.
pub async fn search_get(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Envelope<SearchResponse>>> {
    let Query(params) = params?;

    let query = non_empty(params.q)
        .or_else(|| non_empty(params.query))
        .ok_or_else(|| ApiError::bad_request("Query parameter is required"))?;

    let options = SearchOptions {
        engine: Some(params.engine.unwrap_or_else(|| DEFAULT_GET_ENGINE.to_string())),
        num: Some(params.num.unwrap_or(DEFAULT_GET_NUM)),
        location: params.location,
        language: params.language,
    };

    Ok(ok(state.toolkit.search.search(&query, options).await))
}

/// `POST {query, action, options}` where action is `search`, `searchNews` or
/// `searchImages`.
pub async fn search_post(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<Envelope<SearchResponse>>> {
    let Json(body) = payload?;

    let query = non_empty(body.query)
        .or_else(|| non_empty(body.q))
        .ok_or_else(|| ApiError::bad_request("Query is required"))?;
    let search = &state.toolkit.search;

    let response = match body.action.as_deref().unwrap_or("search") {
        "search" => search.search(&query, body.options).await,
        "searchNews" | "search-news" => search.search_news(&query, body.options).await,
        "searchImages" | "search-images" => search.search_images(&query, body.options).await,
        _ => return Err(ApiError::invalid_action()),
    };

    Ok(ok(response))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::test_support::*;

    #[tokio::test]
    async fn test_get_requires_query() {
        let response = offline_app().oneshot(get("/api/tools/search")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Query parameter is required");
    }

    #[tokio::test]
    async fn test_get_degrades_to_guidance() {
        let response = offline_app()
            .oneshot(get("/api/tools/search?q=learn%20python"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["query"], "learn python");
        assert_eq!(body["data"]["results"][0]["source"], "Developer Resources");
        assert_eq!(body["data"]["suggestions"][0], "learn python tutorial");
    }

    #[tokio::test]
    async fn test_post_news_action() {
        let response = offline_app()
            .oneshot(post_json(
                "/api/tools/search",
                json!({"query": "rust", "action": "searchNews"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["query"], "rust news");
    }

    #[tokio::test]
    async fn test_post_accepts_q_alias() {
        let response = offline_app()
            .oneshot(post_json("/api/tools/search", json!({"q": "ferris"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["query"], "ferris");
    }

    #[tokio::test]
    async fn test_post_prefers_query_over_q() {
        let response = offline_app()
            .oneshot(post_json(
                "/api/tools/search",
                json!({"query": "borrow checker", "q": "ferris"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["query"], "borrow checker");
    }

    #[tokio::test]
    async fn test_post_invalid_action() {
        let response = offline_app()
            .oneshot(post_json(
                "/api/tools/search",
                json!({"query": "rust", "action": "searchVideos"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid action");
    }
}
