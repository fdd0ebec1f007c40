use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::{Config, NetworkSelector};
use crate::error::{Result, StacksError};
use crate::tools::{parse_arguments, ToolDefinition};

pub const CHECK_API_STATUS: &str = "check_api_status";

const SETUP_URL: &str = "https://www.hiro.so/";
const PROBE_PATH: &str = "/v2/info";
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiStatusRequest {
    #[serde(default)]
    pub include_limits: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyStatus {
    pub configured: bool,
    pub status: &'static str,
    #[serde(rename = "setupUrl")]
    pub setup_url: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSummary {
    pub mainnet_url: String,
    pub testnet_url: String,
    pub mocknet_url: String,
    pub timeout: String,
    pub debug: bool,
    pub default_network: NetworkSelector,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RateLimitReport {
    Reachable {
        #[serde(rename = "testResult")]
        test_result: String,
        limit: String,
        remaining: String,
        reset: String,
    },
    Unreachable {
        #[serde(rename = "testResult")]
        test_result: String,
        note: &'static str,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    pub api_key: ApiKeyStatus,
    pub configuration: ConfigurationSummary,
    pub networks: Vec<NetworkSelector>,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limits: Option<RateLimitReport>,
}

pub struct InternalTools {
    config: Config,
    api: ApiClient,
}

impl InternalTools {
    pub fn new(config: Config, api: ApiClient) -> Self {
        InternalTools { config, api }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition::new(
            CHECK_API_STATUS,
            "Check API key status and configuration",
            json!({
                "type": "object",
                "properties": {
                    "include_limits": {
                        "type": "boolean",
                        "description": "Include rate limit information if available",
                        "default": true
                    }
                }
            }),
        )]
    }

    pub async fn handle(&self, tool_name: &str, arguments: Value) -> Result<Value> {
        match tool_name {
            CHECK_API_STATUS => {
                let request = parse_arguments(tool_name, arguments)?;
                Ok(serde_json::to_value(self.check_status(request).await)?)
            }
            other => Err(StacksError::UnknownTool(other.to_string())),
        }
    }

    /// Never fails: probe errors are reported inside `rateLimits`.
    pub async fn check_status(&self, request: ApiStatusRequest) -> ApiStatus {
        let configured = self.config.has_api_key();
        let include_limits = request.include_limits != Some(false);

        let rate_limits = if include_limits {
            Some(self.probe().await)
        } else {
            None
        };

        ApiStatus {
            api_key: ApiKeyStatus {
                configured,
                status: if configured {
                    "Active (enhanced rate limits)"
                } else {
                    "Not configured (free tier)"
                },
                setup_url: SETUP_URL,
            },
            configuration: ConfigurationSummary {
                mainnet_url: self.config.mainnet_url.clone(),
                testnet_url: self.config.testnet_url.clone(),
                mocknet_url: self.config.mocknet_url.clone(),
                timeout: format!("{}ms", self.config.timeout_ms),
                debug: self.config.debug,
                default_network: self.config.default_network,
            },
            networks: NetworkSelector::ALL.to_vec(),
            checked_at: Utc::now(),
            rate_limits,
        }
    }

    /// One live request against the default network, bounded by the
    /// configured per-call timeout.
    async fn probe(&self) -> RateLimitReport {
        let network = self.config.default_network;
        info!("Probing {} API at {}", network, self.api.url_for(network, PROBE_PATH));

        match self.api.probe(network, PROBE_PATH).await {
            Ok(outcome) => {
                let header = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());
                RateLimitReport::Reachable {
                    test_result: if outcome.ok {
                        "API accessible".to_string()
                    } else {
                        format!("Error: {}", outcome.status)
                    },
                    limit: header(outcome.rate_limit.limit),
                    remaining: header(outcome.rate_limit.remaining),
                    reset: header(outcome.rate_limit.reset),
                }
            }
            Err(e) => {
                warn!("API probe failed: {}", e);
                RateLimitReport::Unreachable {
                    test_result: format!("Connection failed: {}", e),
                    note: "Check your internet connection and API endpoints",
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn tools_with(config: Config) -> InternalTools {
        let api = ApiClient::new(&config).unwrap();
        InternalTools::new(config, api)
    }

    #[tokio::test]
    async fn test_include_limits_false_skips_probe() {
        let mut server = mockito::Server::new_async().await;
        let never = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let tools = tools_with(Config::from_url(server.url()));
        let payload = tools
            .handle(CHECK_API_STATUS, json!({"include_limits": false}))
            .await
            .unwrap();

        assert!(payload.get("rateLimits").is_none());
        assert_eq!(payload["apiKey"]["configured"], json!(false));
        assert_eq!(payload["configuration"]["timeout"], json!("30000ms"));
        assert_eq!(payload["networks"], json!(["mainnet", "testnet", "mocknet"]));
        never.assert_async().await;
    }

    #[tokio::test]
    async fn test_probe_reports_rate_limits() {
        let mut server = mockito::Server::new_async().await;
        let probe = server
            .mock("GET", "/v2/info")
            .match_header("x-api-key", "k")
            .with_status(200)
            .with_header("x-ratelimit-limit", "500")
            .with_header("x-ratelimit-remaining", "321")
            .with_body("{}")
            .create_async()
            .await;

        let mut config = Config::from_url(server.url());
        config.api_key = Some("k".to_string());
        let tools = tools_with(config);
        let payload = tools.handle(CHECK_API_STATUS, Value::Null).await.unwrap();

        assert_eq!(payload["apiKey"]["configured"], json!(true));
        let limits = &payload["rateLimits"];
        assert_eq!(limits["testResult"], json!("API accessible"));
        assert_eq!(limits["limit"], json!("500"));
        assert_eq!(limits["remaining"], json!("321"));
        assert_eq!(limits["reset"], json!("Unknown"));
        probe.assert_async().await;
    }

    #[tokio::test]
    async fn test_probe_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/info")
            .with_status(503)
            .create_async()
            .await;

        let tools = tools_with(Config::from_url(server.url()));
        let status = tools
            .check_status(ApiStatusRequest {
                include_limits: Some(true),
            })
            .await;

        match status.rate_limits {
            Some(RateLimitReport::Reachable { test_result, .. }) => {
                assert_eq!(test_result, "Error: 503")
            }
            other => panic!("unexpected report: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_connection_failure_is_not_a_tool_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let tools = tools_with(Config::from_url(format!("http://{}", addr)));
        let payload = tools.handle(CHECK_API_STATUS, json!({})).await.unwrap();

        let limits = &payload["rateLimits"];
        assert!(limits["testResult"]
            .as_str()
            .unwrap()
            .starts_with("Connection failed:"));
        assert!(limits["note"].is_string());
    }
}
