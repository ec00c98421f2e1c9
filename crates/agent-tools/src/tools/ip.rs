//! IP address lookup, geolocation and validation.

use std::net::IpAddr;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::config::ToolsConfig;
use crate::error::ToolError;
use crate::fallback::{FallbackChain, Provider};
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::tools::http_client;

/// Returned when no echo service answers.
pub const UNKNOWN: &str = "Unknown";

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
    .expect("valid IPv4 pattern")
});

// Eight full groups only; `::` compression is not accepted.
static IPV6: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}$").expect("valid IPv6 pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpType {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
}

impl IpType {
    /// Anything containing `:` is treated as IPv6.
    pub fn detect(ip: &str) -> Self {
        if ip.contains(':') {
            IpType::V6
        } else {
            IpType::V4
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    pub country: String,
    pub region: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

/// No detection is performed; every flag is false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFlags {
    pub is_proxy: bool,
    pub is_vpn: bool,
    pub is_tor: bool,
    pub is_threat: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpInfo {
    pub ip: String,
    #[serde(rename = "type")]
    pub ip_type: IpType,
    pub location: IpLocation,
    pub isp: String,
    pub organization: String,
    pub asn: String,
    pub security: SecurityFlags,
}

impl IpInfo {
    /// Placeholder for an address the geolocation providers could not describe.
    pub fn unknown(ip: &str) -> Self {
        Self::from_record(ip, GeoRecord::default())
    }

    fn from_record(ip: &str, record: GeoRecord) -> Self {
        let or_unknown = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN.to_string());
        let org = or_unknown(record.org);

        Self {
            ip: ip.to_string(),
            ip_type: IpType::detect(ip),
            location: IpLocation {
                country: or_unknown(record.country_name),
                region: or_unknown(record.region),
                city: or_unknown(record.city),
                latitude: record.latitude.unwrap_or(0.0),
                longitude: record.longitude.unwrap_or(0.0),
                timezone: or_unknown(record.timezone),
            },
            isp: org.clone(),
            organization: org,
            asn: or_unknown(record.asn),
            security: SecurityFlags::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    #[serde(rename = "publicIP")]
    pub public_ip: String,
    #[serde(rename = "localIPs")]
    pub local_ips: Vec<String>,
    pub ip_info: IpInfo,
}

/// Geolocation fields as reported by ipapi.co.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeoRecord {
    pub country_name: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub org: Option<String>,
    pub asn: Option<String>,
    /// ipapi.co answers some failures with 200 and `"error": true`.
    #[serde(default)]
    pub error: bool,
    pub reason: Option<String>,
}

/// A public-IP echo service answering `{"ip": ..}` or `{"origin": ..}`.
pub struct EchoService {
    client: Client,
    url: String,
}

impl EchoService {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Provider<(), String> for EchoService {
    fn name(&self) -> &str {
        &self.url
    }

    async fn attempt(&self, _query: &()) -> Result<String, ToolError> {
        let body: Value = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body.get("ip")
            .or_else(|| body.get("origin"))
            .and_then(Value::as_str)
            .filter(|ip| !ip.is_empty())
            .map(String::from)
            .ok_or_else(|| ToolError::Upstream(format!("{} returned no address", self.url)))
    }
}

/// Geolocation via `{base}/{ip}/json/`.
pub struct IpApiProvider {
    client: Client,
    base_url: String,
}

impl IpApiProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Provider<str, GeoRecord> for IpApiProvider {
    fn name(&self) -> &str {
        "ipapi"
    }

    async fn attempt(&self, ip: &str) -> Result<GeoRecord, ToolError> {
        let url = format!("{}/{}/json/", self.base_url, ip);

        let record: GeoRecord = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if record.error {
            return Err(ToolError::Upstream(
                record.reason.unwrap_or_else(|| "geolocation refused".to_string()),
            ));
        }
        Ok(record)
    }
}

/// Public IP discovery, geolocation with a TTL cache, and address checks.
pub struct IpResolver {
    echo: FallbackChain<(), String>,
    geo: FallbackChain<str, GeoRecord>,
    cache: TtlCache<IpInfo>,
    probe: Client,
}

impl IpResolver {
    pub fn new(
        echo: FallbackChain<(), String>,
        geo: FallbackChain<str, GeoRecord>,
        cache: TtlCache<IpInfo>,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            echo,
            geo,
            cache,
            probe: http_client(None)?,
        })
    }

    pub fn from_config(config: &ToolsConfig) -> Result<Self, ToolError> {
        let client = http_client(Some(config.upstream_timeout))?;

        let mut echo = FallbackChain::new("public-ip", config.upstream_timeout);
        for url in &config.ip_echo_urls {
            echo = echo.with_provider(EchoService::new(client.clone(), url.clone()));
        }

        let geo = FallbackChain::new("geolocation", config.upstream_timeout)
            .with_provider(IpApiProvider::new(client, config.ip_geo_url.clone()));

        Self::new(echo, geo, TtlCache::new(config.ip_cache_ttl))
    }

    /// The caller's public address, or `"Unknown"` when no service answers.
    pub async fn public_ip(&self) -> String {
        match self.echo.run(&()).await {
            Ok(resolved) => resolved.value,
            Err(e) => {
                warn!("Failed to get public IP: {}", e);
                UNKNOWN.to_string()
            }
        }
    }

    /// Geolocation for `ip`, or for the public address when `ip` is `None`.
    ///
    /// Successful lookups are cached; the all-unknown fallback is not, so the
    /// next call retries the provider.
    pub async fn info(&self, ip: Option<&str>) -> IpInfo {
        let target = match ip.map(str::trim).filter(|ip| !ip.is_empty()) {
            Some(ip) => ip.to_string(),
            None => self.public_ip().await,
        };

        if let Some(cached) = self.cache.get(&target).await {
            debug!("IP info cache hit for {}", target);
            return cached;
        }

        match self.geo.run(target.as_str()).await {
            Ok(resolved) => {
                let info = IpInfo::from_record(&target, resolved.value);
                self.cache.insert(target, info.clone()).await;
                info
            }
            Err(e) => {
                warn!("Failed to get IP info for {}: {}", target, e);
                IpInfo::unknown(&target)
            }
        }
    }

    /// Best-effort HEAD probe of `http://{ip}`. Any response counts as reachable.
    pub async fn reachability(&self, ip: &str, timeout_ms: u64) -> bool {
        let url = format!("http://{}", ip);
        match self
            .probe
            .head(&url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
        {
            Ok(_) => true,
            Err(e) => {
                debug!("Reachability probe of {} failed: {}", ip, e);
                false
            }
        }
    }

    /// Strict dotted-quad IPv4 or full eight-group IPv6.
    pub fn validate(ip: &str) -> bool {
        IPV4.is_match(ip) || IPV6.is_match(ip)
    }

    /// Private or loopback IPv4. Always false for IPv6 and invalid input.
    pub fn is_private(ip: &str) -> bool {
        if !Self::validate(ip) {
            return false;
        }

        let octets = match ip.split('.').map(str::parse::<u8>).collect::<Result<Vec<_>, _>>() {
            Ok(octets) => octets,
            Err(_) => return false,
        };

        match octets.as_slice() {
            [10, ..] => true,
            [172, second, ..] => (16..=31).contains(second),
            [192, 168, ..] => true,
            [127, ..] => true,
            _ => false,
        }
    }

    /// Every non-loopback IPv4 address on the host's interfaces.
    pub async fn local_ips(&self) -> Vec<String> {
        let interfaces = match tokio::task::spawn_blocking(if_addrs::get_if_addrs).await {
            Ok(Ok(interfaces)) => interfaces,
            Ok(Err(e)) => {
                warn!("Failed to get local IPs: {}", e);
                return Vec::new();
            }
            Err(e) => {
                warn!("Interface lookup task failed: {}", e);
                return Vec::new();
            }
        };

        external_ipv4(interfaces.iter().map(|iface| iface.ip()))
    }

    pub async fn network_info(&self) -> NetworkInfo {
        let public_ip = self.public_ip().await;
        let local_ips = self.local_ips().await;
        let ip_info = self.info(Some(&public_ip)).await;

        NetworkInfo {
            public_ip,
            local_ips,
            ip_info,
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

/// Keep IPv4 addresses that are neither loopback nor unspecified, in order,
/// without duplicates.
pub fn external_ipv4(addrs: impl IntoIterator<Item = IpAddr>) -> Vec<String> {
    let mut ips: Vec<String> = Vec::new();
    for addr in addrs {
        if !addr.is_ipv4() || addr.is_loopback() || addr.is_unspecified() {
            continue;
        }
        let ip = addr.to_string();
        if !ips.contains(&ip) {
            ips.push(ip);
        }
    }
    ips
}

/// Tool adapter for [`IpResolver`].
pub struct IpTool {
    resolver: Arc<IpResolver>,
}

impl IpTool {
    pub fn new(resolver: Arc<IpResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Tool for IpTool {
    fn name(&self) -> &str {
        "ip"
    }

    fn description(&self) -> &str {
        "Get IP address and location information"
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let ip = args.get_string_opt("ip");
        let info = self.resolver.info(ip.as_deref()).await;

        let content = format!(
            "Your IP information: {} ({}, {}, {})",
            info.ip, info.location.city, info.location.region, info.location.country
        );
        Ok(ToolOutput::success(content).with_data(serde_json::to_value(&info)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TTL: Duration = Duration::from_secs(300);

    fn resolver_for(server: &MockServer, echo_paths: &[&str], clock: Arc<ManualClock>) -> IpResolver {
        let client = http_client(Some(Duration::from_secs(2))).unwrap();
        let mut echo = FallbackChain::new("public-ip", Duration::from_secs(2));
        for p in echo_paths {
            echo = echo.with_provider(EchoService::new(client.clone(), format!("{}{}", server.uri(), p)));
        }
        let geo = FallbackChain::new("geolocation", Duration::from_secs(2))
            .with_provider(IpApiProvider::new(client, server.uri()));

        IpResolver::new(echo, geo, TtlCache::with_clock(TTL, clock)).unwrap()
    }

    fn berlin() -> serde_json::Value {
        json!({
            "ip": "1.2.3.4",
            "city": "Berlin",
            "region": "Land Berlin",
            "country_name": "Germany",
            "latitude": 52.52,
            "longitude": 13.405,
            "timezone": "Europe/Berlin",
            "asn": "AS3320",
            "org": "Deutsche Telekom AG"
        })
    }

    #[test]
    fn test_validate() {
        assert!(IpResolver::validate("192.168.1.1"));
        assert!(IpResolver::validate("0.0.0.0"));
        assert!(IpResolver::validate("2001:0db8:85a3:0000:0000:8a2e:0370:7334"));
        assert!(!IpResolver::validate("999.1.1.1"));
        assert!(!IpResolver::validate("192.168.1"));
        assert!(!IpResolver::validate("2001:db8::1"));
        assert!(!IpResolver::validate("not an ip"));
    }

    #[test]
    fn test_external_ipv4_filter() {
        let addrs: Vec<IpAddr> = [
            "127.0.0.1",
            "192.168.1.20",
            "::1",
            "fe80::1",
            "10.0.0.5",
            "0.0.0.0",
            "192.168.1.20",
        ]
        .iter()
        .map(|ip| ip.parse().unwrap())
        .collect();

        assert_eq!(external_ipv4(addrs), vec!["192.168.1.20", "10.0.0.5"]);
        assert!(external_ipv4(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_local_ips_excludes_loopback() {
        let resolver = IpResolver::from_config(&ToolsConfig::default()).unwrap();
        for ip in resolver.local_ips().await {
            let addr: IpAddr = ip.parse().unwrap();
            assert!(addr.is_ipv4());
            assert!(!addr.is_loopback());
        }
    }

    #[test]
    fn test_is_private() {
        assert!(IpResolver::is_private("10.0.0.5"));
        assert!(IpResolver::is_private("172.16.0.1"));
        assert!(IpResolver::is_private("172.31.255.255"));
        assert!(IpResolver::is_private("192.168.0.10"));
        assert!(IpResolver::is_private("127.0.0.1"));
        assert!(!IpResolver::is_private("172.32.0.1"));
        assert!(!IpResolver::is_private("8.8.8.8"));
        assert!(!IpResolver::is_private("10.0.0"));
        assert!(!IpResolver::is_private("fe80:0000:0000:0000:0000:0000:0000:0001"));
    }

    #[test]
    fn test_ip_type_and_serialization() {
        assert_eq!(IpType::detect("::1"), IpType::V6);
        assert_eq!(IpType::detect("8.8.8.8"), IpType::V4);

        let json = serde_json::to_value(IpInfo::unknown("8.8.8.8")).unwrap();
        assert_eq!(json["type"], "IPv4");
        assert_eq!(json["location"]["city"], "Unknown");
        assert_eq!(json["location"]["latitude"], 0.0);
        assert_eq!(json["security"]["isProxy"], false);
    }

    #[tokio::test]
    async fn test_public_ip_falls_through_echo_services() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ipify"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/httpbin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"origin": "5.6.7.8"})))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server, &["/ipify", "/httpbin"], Arc::new(ManualClock::new()));
        assert_eq!(resolver.public_ip().await, "5.6.7.8");
    }

    #[tokio::test]
    async fn test_public_ip_unknown_when_all_fail() {
        let server = MockServer::start().await;
        let resolver = resolver_for(&server, &["/a", "/b", "/c"], Arc::new(ManualClock::new()));
        assert_eq!(resolver.public_ip().await, UNKNOWN);
    }

    #[tokio::test]
    async fn test_info_is_cached_for_ttl() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.2.3.4/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(berlin()))
            .expect(2)
            .mount(&server)
            .await;

        let clock = Arc::new(ManualClock::new());
        let resolver = resolver_for(&server, &[], clock.clone());

        let first = resolver.info(Some("1.2.3.4")).await;
        clock.advance(Duration::from_secs(120));
        let second = resolver.info(Some("1.2.3.4")).await;
        assert_eq!(first, second);
        assert_eq!(first.location.city, "Berlin");
        assert_eq!(first.isp, "Deutsche Telekom AG");
        assert_eq!(first.asn, "AS3320");

        clock.advance(Duration::from_secs(181));
        let third = resolver.info(Some("1.2.3.4")).await;
        assert_eq!(third.location.country, "Germany");
        // MockServer verifies exactly two provider calls on drop.
    }

    #[tokio::test]
    async fn test_failed_lookup_is_not_cached() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/9.9.9.9/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": true,
                "reason": "RateLimited"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let resolver = resolver_for(&server, &[], Arc::new(ManualClock::new()));

        let first = resolver.info(Some("9.9.9.9")).await;
        assert_eq!(first, IpInfo::unknown("9.9.9.9"));
        let second = resolver.info(Some("9.9.9.9")).await;
        assert_eq!(second.location.city, UNKNOWN);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.2.3.4/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(berlin()))
            .expect(2)
            .mount(&server)
            .await;

        let resolver = resolver_for(&server, &[], Arc::new(ManualClock::new()));
        resolver.info(Some("1.2.3.4")).await;
        resolver.clear_cache().await;
        resolver.info(Some("1.2.3.4")).await;
    }

    #[tokio::test]
    async fn test_tool_resolves_public_ip_first() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ipify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ip": "1.2.3.4"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/1.2.3.4/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(berlin()))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server, &["/ipify"], Arc::new(ManualClock::new()));
        let output = IpTool::new(Arc::new(resolver))
            .execute(ToolArgs::default())
            .await
            .unwrap();

        assert_eq!(
            output.content,
            "Your IP information: 1.2.3.4 (Berlin, Land Berlin, Germany)"
        );
        assert_eq!(output.data["type"], "IPv4");
    }

    #[tokio::test]
    async fn test_reachability_of_closed_port_is_false() {
        let server = MockServer::start().await;
        let resolver = resolver_for(&server, &[], Arc::new(ManualClock::new()));
        // Port 9 (discard) is closed on loopback in test environments.
        assert!(!resolver.reachability("127.0.0.1:9", 500).await);
    }

    #[tokio::test]
    async fn test_reachability_of_live_server_is_true() {
        let server = MockServer::start().await;
        let resolver = resolver_for(&server, &[], Arc::new(ManualClock::new()));
        let authority = server.uri().trim_start_matches("http://").to_string();
        // Unmatched requests get a 404, which still counts as a response.
        assert!(resolver.reachability(&authority, 2000).await);
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_live_network_info() {
        let resolver = IpResolver::from_config(&ToolsConfig::default()).unwrap();
        let info = resolver.network_info().await;
        assert_ne!(info.public_ip, UNKNOWN);
    }
}
