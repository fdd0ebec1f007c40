use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::StacksError;

pub const DEFAULT_MAINNET_URL: &str = "https://api.mainnet.hiro.so";
pub const DEFAULT_TESTNET_URL: &str = "https://api.testnet.hiro.so";
pub const DEFAULT_MOCKNET_URL: &str = "http://localhost:3999";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Stacks network a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkSelector {
    Mainnet,
    Testnet,
    Mocknet,
}

impl NetworkSelector {
    /// Used whenever a selector string is not one of the three known values.
    pub const FALLBACK: NetworkSelector = NetworkSelector::Testnet;

    pub const ALL: [NetworkSelector; 3] = [
        NetworkSelector::Mainnet,
        NetworkSelector::Testnet,
        NetworkSelector::Mocknet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkSelector::Mainnet => "mainnet",
            NetworkSelector::Testnet => "testnet",
            NetworkSelector::Mocknet => "mocknet",
        }
    }

    /// Parse case-insensitively, falling back to [`NetworkSelector::FALLBACK`].
    pub fn parse_or_fallback(raw: &str) -> NetworkSelector {
        raw.parse().unwrap_or(NetworkSelector::FALLBACK)
    }
}

impl FromStr for NetworkSelector {
    type Err = StacksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(NetworkSelector::Mainnet),
            "testnet" => Ok(NetworkSelector::Testnet),
            "mocknet" => Ok(NetworkSelector::Mocknet),
            other => Err(StacksError::Config(format!(
                "Invalid network '{}'. Valid values: mainnet, testnet, mocknet",
                other
            ))),
        }
    }
}

impl fmt::Display for NetworkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub mainnet_url: String,
    pub testnet_url: String,
    pub mocknet_url: String,
    pub timeout_ms: u64,
    pub debug: bool,
    pub default_network: NetworkSelector,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary variable lookup.
    ///
    /// Never fails: invalid values are replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_network = non_empty("STACKS_NETWORK");
        let default_network = match raw_network.as_deref() {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "Invalid STACKS_NETWORK value: {}. Using '{}' as default (valid values: mainnet, testnet, mocknet)",
                    raw,
                    NetworkSelector::FALLBACK
                );
                NetworkSelector::FALLBACK
            }),
            None => NetworkSelector::FALLBACK,
        };

        let timeout_ms = non_empty("MCP_SERVER_TIMEOUT")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let debug = parse_flag(non_empty("DEBUG").as_deref());

        let base_url = |key: &str, default: &str| {
            non_empty(key)
                .unwrap_or_else(|| default.to_string())
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        let config = Config {
            api_key: non_empty("HIRO_API_KEY"),
            mainnet_url: base_url("HIRO_MAINNET_API_URL", DEFAULT_MAINNET_URL),
            testnet_url: base_url("HIRO_TESTNET_API_URL", DEFAULT_TESTNET_URL),
            mocknet_url: base_url("HIRO_MOCKNET_API_URL", DEFAULT_MOCKNET_URL),
            timeout_ms,
            debug,
            default_network,
        };

        if config.debug {
            config.log_summary();
        }

        config
    }

    /// Point every network at one base URL (local devnets, test servers).
    pub fn from_url(base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Config {
            api_key: None,
            mainnet_url: base_url.clone(),
            testnet_url: base_url.clone(),
            mocknet_url: base_url,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            debug: false,
            default_network: NetworkSelector::FALLBACK,
        }
    }

    /// Base URL configured for a network.
    pub fn base_url(&self, network: NetworkSelector) -> &str {
        match network {
            NetworkSelector::Mainnet => &self.mainnet_url,
            NetworkSelector::Testnet => &self.testnet_url,
            NetworkSelector::Mocknet => &self.mocknet_url,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn log_summary(&self) {
        debug!(
            "HIRO_API_KEY: {}",
            if self.has_api_key() {
                "configured"
            } else {
                "not set (using free tier)"
            }
        );
        debug!("DEFAULT_NETWORK: {}", self.default_network);
        debug!("MAINNET_URL: {}", self.mainnet_url);
        debug!("TESTNET_URL: {}", self.testnet_url);
        debug!("MOCKNET_URL: {}", self.mocknet_url);
        debug!("TIMEOUT: {}ms", self.timeout_ms);
    }
}

/// `"1"` or `"true"` (any case) switch a flag on; anything else leaves it off.
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(|v| {
        let v = v.trim().to_lowercase();
        v == "1" || v == "true"
    })
    .unwrap_or(false)
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
