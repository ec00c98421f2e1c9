//! Time endpoint.

use agent_tools::tools::format_locale;
use agent_tools::{TimeInfo, TimeUnit};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use super::{ok, Envelope};
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TimeBody {
    pub action: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    /// Unix milliseconds.
    pub timestamp: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TimeData {
    Current(TimeInfo),
    Timezone {
        timezone: String,
    },
    Added {
        #[serde(rename = "newTime")]
        new_time: String,
        formatted: String,
    },
    Formatted {
        formatted: String,
    },
}

/// Current time snapshot.
pub async fn time_get(State(state): State<AppState>) -> Json<Envelope<TimeInfo>> {
    ok(state.toolkit.clock.current_time())
}

/// `POST {action, ..}` where action is `getCurrentTime`, `getTimezone`,
/// `addTime {amount, unit}` or `formatTime {timestamp}`.
pub async fn time_post(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TimeBody>, JsonRejection>,
) -> Result<Json<Envelope<TimeData>>> {
    let Json(body) = payload?;
    let clock = &state.toolkit.clock;

    let data = match body.action.as_deref().unwrap_or_default() {
        "getCurrentTime" => TimeData::Current(clock.current_time()),
        "getTimezone" => TimeData::Timezone {
            timezone: clock.timezone(),
        },
        "addTime" => {
            let amount = body
                .amount
                .ok_or_else(|| ApiError::bad_request("amount is required"))?;
            let unit: TimeUnit = body
                .unit
                .as_deref()
                .ok_or_else(|| ApiError::bad_request("unit is required"))?
                .parse()
                .map_err(|e| state.tool_error(e))?;
            let shifted = clock
                .add_time(amount, unit)
                .ok_or_else(|| ApiError::bad_request("Resulting time is out of range"))?;

            TimeData::Added {
                new_time: shifted.to_rfc3339_opts(SecondsFormat::Millis, true),
                formatted: format_locale(&shifted),
            }
        }
        "formatTime" => {
            let timestamp = body
                .timestamp
                .ok_or_else(|| ApiError::bad_request("timestamp is required"))?;
            let formatted = clock
                .format_time(timestamp)
                .ok_or_else(|| ApiError::bad_request("timestamp is out of range"))?;
            TimeData::Formatted { formatted }
        }
        _ => return Err(ApiError::invalid_action()),
    };

    Ok(ok(data))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::test_support::*;

    #[tokio::test]
    async fn test_get_current_time() {
        let response = offline_app().oneshot(get("/api/tools/time")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["timezone"], "UTC");
        assert!(body["data"]["formatted"]["full"].is_string());
    }

    #[tokio::test]
    async fn test_get_timezone() {
        let response = offline_app()
            .oneshot(post_json("/api/tools/time", json!({"action": "getTimezone"})))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["data"]["timezone"], "UTC");
    }

    #[tokio::test]
    async fn test_add_time() {
        let response = offline_app()
            .oneshot(post_json(
                "/api/tools/time",
                json!({"action": "addTime", "amount": 2, "unit": "hours"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["data"]["newTime"].is_string());
        assert!(body["data"]["formatted"].is_string());
    }

    #[tokio::test]
    async fn test_add_time_rejects_bad_unit() {
        let response = offline_app()
            .oneshot(post_json(
                "/api/tools/time",
                json!({"action": "addTime", "amount": 2, "unit": "fortnights"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_format_time_out_of_range() {
        let response = offline_app()
            .oneshot(post_json(
                "/api/tools/time",
                json!({"action": "formatTime", "timestamp": i64::MAX}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_action() {
        let response = offline_app()
            .oneshot(post_json("/api/tools/time", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid action");
    }
}
