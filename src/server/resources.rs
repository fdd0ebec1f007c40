use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::api::ApiClient;
use crate::error::{Result, StacksError};

const SCHEME: &str = "stacks";
const JSON_MIME: &str = "application/json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub uri: String,
    pub mime_type: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// `stacks://` resources: the static network list and live network info.
pub struct ResourceCatalog {
    api: ApiClient,
}

impl ResourceCatalog {
    pub fn new(api: ApiClient) -> Self {
        ResourceCatalog { api }
    }

    pub fn list(&self) -> Vec<ResourceDefinition> {
        let resource = |uri: &str, name: &str, description: &str| ResourceDefinition {
            uri: uri.to_string(),
            mime_type: JSON_MIME.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        };

        vec![
            resource(
                "stacks://networks",
                "Stacks Networks",
                "Available Stacks network configurations",
            ),
            resource(
                "stacks://network-info/testnet",
                "Testnet Info",
                "Current Stacks testnet information",
            ),
            resource(
                "stacks://network-info/mainnet",
                "Mainnet Info",
                "Current Stacks mainnet information",
            ),
        ]
    }

    pub async fn read(&self, uri: &str) -> Result<Vec<ResourceContents>> {
        let path = resource_path(uri)?;
        debug!("Reading resource {}", path);

        let payload = if path == "networks" {
            let networks: Vec<_> = self
                .api
                .networks()
                .profiles()
                .iter()
                .map(|profile| {
                    json!({
                        "name": profile.selector,
                        "description": profile.display_name,
                        "url": profile.base_url
                    })
                })
                .collect();
            json!({ "networks": networks })
        } else if let Some(name) = path.strip_prefix("network-info/") {
            let network = self.api.networks().resolve(Some(name));
            let (core_info, network_info) = tokio::join!(
                self.api.get(network, "/v2/info"),
                self.api.get(network, "/extended/v2/network"),
            );
            json!({
                "network": network,
                "coreInfo": core_info?,
                "networkInfo": network_info?
            })
        } else {
            return Err(StacksError::UnknownResource(path));
        };

        Ok(vec![ResourceContents {
            uri: uri.to_string(),
            mime_type: JSON_MIME.to_string(),
            text: serde_json::to_string_pretty(&payload)?,
        }])
    }
}

/// `stacks://network-info/testnet` → `network-info/testnet`.
fn resource_path(uri: &str) -> Result<String> {
    let url = Url::parse(uri).map_err(|e| StacksError::InvalidUri(format!("{}: {}", uri, e)))?;
    if url.scheme() != SCHEME {
        return Err(StacksError::InvalidUri(format!(
            "{}: expected {}:// scheme",
            uri, SCHEME
        )));
    }

    let host = url.host_str().unwrap_or_default();
    let path = format!("{}{}", host, url.path());
    Ok(path.trim_matches('/').to_string())
}
