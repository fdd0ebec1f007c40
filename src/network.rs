use serde::Serialize;

use crate::config::{Config, NetworkSelector};

/// Base URL and display name of one Stacks network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkProfile {
    pub selector: NetworkSelector,
    pub base_url: String,
    pub display_name: &'static str,
}

/// Network profiles, built once from [`Config`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    mainnet: NetworkProfile,
    testnet: NetworkProfile,
    mocknet: NetworkProfile,
    default_network: NetworkSelector,
}

impl NetworkRegistry {
    pub fn from_config(config: &Config) -> Self {
        let profile = |selector: NetworkSelector, display_name: &'static str| NetworkProfile {
            selector,
            base_url: config.base_url(selector).to_string(),
            display_name,
        };

        NetworkRegistry {
            mainnet: profile(NetworkSelector::Mainnet, "Stacks Mainnet"),
            testnet: profile(NetworkSelector::Testnet, "Stacks Testnet"),
            mocknet: profile(NetworkSelector::Mocknet, "Stacks Mocknet"),
            default_network: config.default_network,
        }
    }

    pub fn profile_for(&self, selector: NetworkSelector) -> &NetworkProfile {
        match selector {
            NetworkSelector::Mainnet => &self.mainnet,
            NetworkSelector::Testnet => &self.testnet,
            NetworkSelector::Mocknet => &self.mocknet,
        }
    }

    /// Resolve the `network` argument of a tool call.
    ///
    /// Absent or blank means the configured default; anything unrecognized
    /// maps to [`NetworkSelector::FALLBACK`].
    pub fn resolve(&self, requested: Option<&str>) -> NetworkSelector {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => NetworkSelector::parse_or_fallback(name),
            None => self.default_network,
        }
    }

    pub fn default_network(&self) -> NetworkSelector {
        self.default_network
    }

    pub fn profiles(&self) -> [&NetworkProfile; 3] {
        [&self.mainnet, &self.testnet, &self.mocknet]
    }
}
