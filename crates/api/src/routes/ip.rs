//! IP endpoint: action dispatch over the resolver.

use std::str::FromStr;

use agent_tools::{IpInfo, IpResolver, NetworkInfo};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ok, Envelope};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Probe timeout when the caller gives none.
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5000;

/// Recognized actions. Both the kebab-case and camelCase spellings parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpAction {
    Info,
    Public,
    Local,
    Network,
    ReachabilityCheck,
    Validate,
    ClearCache,
}

impl FromStr for IpAction {
    type Err = ApiError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "info" | "getInfo" => Ok(IpAction::Info),
            "public" | "getPublicIP" => Ok(IpAction::Public),
            "local" | "getLocalIPs" => Ok(IpAction::Local),
            "network" | "getNetworkInfo" => Ok(IpAction::Network),
            "reachability-check" | "checkReachability" => Ok(IpAction::ReachabilityCheck),
            "validate" | "validateIP" => Ok(IpAction::Validate),
            "clear-cache" | "clearCache" => Ok(IpAction::ClearCache),
            _ => Err(ApiError::invalid_action()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IpRequest {
    pub action: Option<String>,
    pub ip: Option<String>,
    /// Probe timeout in milliseconds.
    pub timeout: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IpData {
    Info(IpInfo),
    Public {
        ip: String,
    },
    Local {
        ips: Vec<String>,
    },
    Network(NetworkInfo),
    Reachability {
        ip: String,
        reachable: bool,
    },
    Validation {
        ip: String,
        valid: bool,
        #[serde(rename = "isPrivate")]
        is_private: bool,
    },
    Cleared {
        message: &'static str,
    },
}

/// `GET ?action=&ip=`. The action defaults to `info`.
pub async fn ip_get(
    State(state): State<AppState>,
    params: std::result::Result<Query<IpRequest>, QueryRejection>,
) -> Result<Json<Envelope<IpData>>> {
    let Query(mut request) = params?;
    request.action.get_or_insert_with(|| "info".to_string());
    dispatch(&state.toolkit.ip, request).await.map(ok)
}

/// `POST {action, ip, timeout}`. The action is required.
pub async fn ip_post(
    State(state): State<AppState>,
    payload: std::result::Result<Json<IpRequest>, JsonRejection>,
) -> Result<Json<Envelope<IpData>>> {
    let Json(request) = payload?;
    dispatch(&state.toolkit.ip, request).await.map(ok)
}

async fn dispatch(resolver: &IpResolver, request: IpRequest) -> Result<IpData> {
    let action: IpAction = request
        .action
        .as_deref()
        .ok_or_else(ApiError::invalid_action)?
        .parse()?;
    let ip = request.ip.filter(|ip| !ip.trim().is_empty());

    let data = match action {
        IpAction::Info => IpData::Info(resolver.info(ip.as_deref()).await),
        IpAction::Public => IpData::Public {
            ip: resolver.public_ip().await,
        },
        IpAction::Local => IpData::Local {
            ips: resolver.local_ips().await,
        },
        IpAction::Network => IpData::Network(resolver.network_info().await),
        IpAction::ReachabilityCheck => {
            let ip = ip.ok_or_else(|| {
                ApiError::bad_request("IP address is required for reachability check")
            })?;
            let timeout = request.timeout.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS);
            let reachable = resolver.reachability(&ip, timeout).await;
            IpData::Reachability { ip, reachable }
        }
        IpAction::Validate => {
            let ip =
                ip.ok_or_else(|| ApiError::bad_request("IP address is required for validation"))?;
            IpData::Validation {
                valid: IpResolver::validate(&ip),
                is_private: IpResolver::is_private(&ip),
                ip,
            }
        }
        IpAction::ClearCache => {
            resolver.clear_cache().await;
            IpData::Cleared {
                message: "Cache cleared successfully",
            }
        }
    };

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::test_support::*;

    #[test]
    fn test_action_spellings() {
        assert_eq!("clear-cache".parse::<IpAction>().unwrap(), IpAction::ClearCache);
        assert_eq!("clearCache".parse::<IpAction>().unwrap(), IpAction::ClearCache);
        assert_eq!(
            "reachability-check".parse::<IpAction>().unwrap(),
            IpAction::ReachabilityCheck
        );
        assert_eq!("validateIP".parse::<IpAction>().unwrap(), IpAction::Validate);
        assert!("traceroute".parse::<IpAction>().is_err());
    }

    #[tokio::test]
    async fn test_validate() {
        let response = offline_app()
            .oneshot(post_json(
                "/api/tools/ip",
                json!({"action": "validate", "ip": "10.0.0.5"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(
            body["data"],
            json!({"ip": "10.0.0.5", "valid": true, "isPrivate": true})
        );
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_address() {
        let response = offline_app()
            .oneshot(get("/api/tools/ip?action=validateIP&ip=999.1.1.1"))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["data"]["valid"], false);
        assert_eq!(body["data"]["isPrivate"], false);
    }

    #[tokio::test]
    async fn test_validate_requires_ip() {
        let response = offline_app()
            .oneshot(post_json("/api/tools/ip", json!({"action": "validate"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "IP address is required for validation"
        );
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let response = offline_app()
            .oneshot(get("/api/tools/ip?action=traceroute"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid action");
    }

    #[tokio::test]
    async fn test_post_requires_action() {
        let response = offline_app()
            .oneshot(post_json("/api/tools/ip", json!({"ip": "1.2.3.4"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_public_ip_unknown_when_offline() {
        let response = offline_app()
            .oneshot(get("/api/tools/ip?action=public"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["ip"], "Unknown");
    }

    #[tokio::test]
    async fn test_info_falls_back_to_unknown() {
        let response = offline_app()
            .oneshot(get("/api/tools/ip?ip=8.8.8.8"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["ip"], "8.8.8.8");
        assert_eq!(body["data"]["type"], "IPv4");
        assert_eq!(body["data"]["location"]["city"], "Unknown");
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let response = offline_app()
            .oneshot(post_json("/api/tools/ip", json!({"action": "clear-cache"})))
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await["data"]["message"],
            "Cache cleared successfully"
        );
    }
}
