use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::{Config, NetworkSelector};
use crate::error::{Result, StacksError};
use crate::network::NetworkRegistry;

/// Client identifier sent with every request.
pub const CLIENT_ID: &str = concat!("stacks-mcp-server/", env!("CARGO_PKG_VERSION"));

pub const API_KEY_HEADER: &str = "x-api-key";

const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

const RATE_LIMIT_GUIDANCE: &str =
    ". Consider using a Hiro API key for higher rate limits: https://www.hiro.so/";

/// Rate-limit headers reported by the Hiro API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RateLimit {
    pub limit: Option<String>,
    pub remaining: Option<String>,
    pub reset: Option<String>,
}

impl RateLimit {
    fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        RateLimit {
            limit: header(RATE_LIMIT_LIMIT),
            remaining: header(RATE_LIMIT_REMAINING),
            reset: header(RATE_LIMIT_RESET),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallOptions {
    pub method: Method,
    pub body: Option<Value>,
}

impl CallOptions {
    pub fn get() -> Self {
        CallOptions {
            method: Method::GET,
            body: None,
        }
    }

    pub fn post(body: Value) -> Self {
        CallOptions {
            method: Method::POST,
            body: Some(body),
        }
    }
}

/// Result of a reachability probe; non-2xx statuses are reported, not raised.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub status: u16,
    pub ok: bool,
    pub rate_limit: RateLimit,
}

struct RawResponse {
    status: StatusCode,
    rate_limit: RateLimit,
    body: Vec<u8>,
}

/// HTTP client for the Hiro Stacks API
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    networks: NetworkRegistry,
    timeout: Duration,
    has_api_key: bool,
    debug: bool,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &Config) -> Result<Self> {
        // Validate URL format
        for network in NetworkSelector::ALL {
            let base_url = config.base_url(network);
            base_url.parse::<url::Url>().map_err(|e| {
                StacksError::Config(format!(
                    "Invalid {} API URL '{}': {}",
                    network, base_url, e
                ))
            })?;
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_ID));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(api_key).map_err(|_| {
                StacksError::Config("HIRO_API_KEY contains invalid header characters".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StacksError::Config(format!("Failed to build HTTP client: {}", e)))?;

        debug!(
            "API client ready (timeout: {}ms, api key: {})",
            config.timeout_ms,
            if config.has_api_key() { "yes" } else { "no" }
        );

        Ok(ApiClient {
            inner: Arc::new(ApiClientInner {
                http,
                networks: NetworkRegistry::from_config(config),
                timeout: Duration::from_millis(config.timeout_ms),
                has_api_key: config.has_api_key(),
                debug: config.debug,
            }),
        })
    }

    pub fn networks(&self) -> &NetworkRegistry {
        &self.inner.networks
    }

    /// Full target address for a path on a network.
    pub fn url_for(&self, network: NetworkSelector, path: &str) -> String {
        format!("{}{}", self.inner.networks.profile_for(network).base_url, path)
    }

    pub async fn get(&self, network: NetworkSelector, path: &str) -> Result<Value> {
        self.call(network, path, CallOptions::get()).await
    }

    pub async fn post(&self, network: NetworkSelector, path: &str, body: Value) -> Result<Value> {
        self.call(network, path, CallOptions::post(body)).await
    }

    /// Perform one request; any non-2xx status is an error.
    pub async fn call(
        &self,
        network: NetworkSelector,
        path: &str,
        options: CallOptions,
    ) -> Result<Value> {
        let url = self.url_for(network, path);
        let raw = self.exchange(&url, options).await?;

        if !raw.status.is_success() {
            let err = remote_status_error(raw.status, &raw.body);
            warn!("{} ({})", err, url);
            return Err(err);
        }

        let body = if raw.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&raw.body).map_err(|e| {
                StacksError::Transport(format!("Invalid JSON in response from {}: {}", url, e))
            })?
        };

        if self.inner.debug {
            if let Some(limit) = &raw.rate_limit.limit {
                debug!(
                    "Rate limit: {}/{} remaining (resets: {})",
                    raw.rate_limit.remaining.as_deref().unwrap_or("?"),
                    limit,
                    raw.rate_limit.reset.as_deref().unwrap_or("?")
                );
            }
        }

        Ok(body)
    }

    /// Issue a GET and report status and rate-limit headers without
    /// interpreting the body.
    pub async fn probe(&self, network: NetworkSelector, path: &str) -> Result<ProbeOutcome> {
        let url = self.url_for(network, path);
        let raw = self.exchange(&url, CallOptions::get()).await?;

        Ok(ProbeOutcome {
            status: raw.status.as_u16(),
            ok: raw.status.is_success(),
            rate_limit: raw.rate_limit,
        })
    }

    async fn exchange(&self, url: &str, options: CallOptions) -> Result<RawResponse> {
        if self.inner.debug {
            debug!("API call: {} {}", options.method, url);
            debug!(
                "Using API key: {}",
                if self.inner.has_api_key {
                    "yes"
                } else {
                    "no (free tier)"
                }
            );
        }

        let mut request = self.inner.http.request(options.method, url);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let rate_limit = RateLimit::from_headers(response.headers());
            let body = response.bytes().await?.to_vec();
            Ok::<_, reqwest::Error>(RawResponse {
                status,
                rate_limit,
                body,
            })
        };

        // Dropping the exchange future on expiry cancels the in-flight request.
        match tokio::time::timeout(self.inner.timeout, exchange).await {
            Ok(result) => result.map_err(|e| self.classify(e, url)),
            Err(_) => {
                warn!("API call timed out after {:?}: {}", self.inner.timeout, url);
                Err(self.timeout_error(url))
            }
        }
    }

    fn timeout_error(&self, url: &str) -> StacksError {
        StacksError::Timeout {
            timeout_ms: self.inner.timeout.as_millis() as u64,
            url: url.to_string(),
        }
    }

    fn classify(&self, err: reqwest::Error, url: &str) -> StacksError {
        if err.is_timeout() {
            self.timeout_error(url)
        } else if err.is_connect()
            || err.is_request()
            || err.is_body()
            || err.is_decode()
            || err.is_redirect()
        {
            warn!("Transport error calling {}: {}", url, err);
            StacksError::Transport(err.to_string())
        } else {
            error!("Unclassified error calling {}: {:?}", url, err);
            StacksError::Unknown {
                url: url.to_string(),
            }
        }
    }
}

fn remote_status_error(status: StatusCode, body: &[u8]) -> StacksError {
    let mut message = format!("API call failed: {}", status);

    // Unparsable bodies leave the bare status text.
    if let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(text) = fields.get(key).and_then(error_text) {
                message.push_str(" - ");
                message.push_str(&text);
            }
        }
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        message.push_str(RATE_LIMIT_GUIDANCE);
    }

    StacksError::RemoteStatus {
        status: status.as_u16(),
        message,
    }
}

/// Falsy fields (`null`, `false`, `0`, `""`) are not appended.
fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
