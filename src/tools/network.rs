use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::config::NetworkSelector;
use crate::error::{Result, StacksError};
use crate::tools::{network_property, parse_arguments, required, ToolDefinition};

pub const GET_BLOCK_INFO: &str = "get_block_info";
pub const GET_NETWORK_STATUS: &str = "get_network_status";

/// Reported in place of a sub-query that was allowed to fail.
pub const NOT_AVAILABLE: &str = "Not available";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    #[serde(default)]
    pub block_id: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkStatusRequest {
    #[serde(default)]
    pub network: Option<String>,
}

/// A block identifier, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRef {
    /// All decimal digits.
    Height(String),
    Hash(String),
}

impl BlockRef {
    pub fn parse(block_id: &str) -> Self {
        if !block_id.is_empty() && block_id.bytes().all(|b| b.is_ascii_digit()) {
            BlockRef::Height(block_id.to_string())
        } else {
            BlockRef::Hash(block_id.to_string())
        }
    }

    pub fn endpoint(&self) -> String {
        match self {
            BlockRef::Height(height) => format!("/extended/v2/blocks/by-height/{}", height),
            BlockRef::Hash(hash) => format!("/extended/v2/blocks/{}", hash),
        }
    }
}

/// Outcome of a sub-query whose failure must not fail the whole call.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionalInfo {
    Available(Value),
    Unavailable,
}

impl OptionalInfo {
    /// Downgrade a failed or empty result to [`OptionalInfo::Unavailable`].
    pub fn from_result(what: &str, result: Result<Value>) -> Self {
        match result {
            Ok(Value::Null) => OptionalInfo::Unavailable,
            Ok(value) => OptionalInfo::Available(value),
            Err(e) => {
                warn!("{} unavailable: {}", what, e);
                OptionalInfo::Unavailable
            }
        }
    }
}

impl Serialize for OptionalInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            OptionalInfo::Available(value) => value.serialize(serializer),
            OptionalInfo::Unavailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockResponse {
    pub network: NetworkSelector,
    pub block: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub core_info: Value,
    pub network_info: Value,
    pub pox_info: OptionalInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkStatusResponse {
    pub network: NetworkSelector,
    pub status: NetworkStatus,
}

pub struct NetworkTools {
    api: ApiClient,
}

impl NetworkTools {
    pub fn new(api: ApiClient) -> Self {
        NetworkTools { api }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let default_network = self.api.networks().default_network();

        vec![
            ToolDefinition::new(
                GET_BLOCK_INFO,
                "Get information about a specific block",
                json!({
                    "type": "object",
                    "properties": {
                        "blockId": {
                            "type": "string",
                            "description": "Block hash or height to look up"
                        },
                        "network": network_property(default_network)
                    },
                    "required": ["blockId"]
                }),
            ),
            ToolDefinition::new(
                GET_NETWORK_STATUS,
                "Get current network status and blockchain information",
                json!({
                    "type": "object",
                    "properties": {
                        "network": network_property(default_network)
                    }
                }),
            ),
        ]
    }

    pub async fn handle(&self, tool_name: &str, arguments: Value) -> Result<Value> {
        match tool_name {
            GET_BLOCK_INFO => {
                let request = parse_arguments(tool_name, arguments)?;
                Ok(serde_json::to_value(self.get_block(request).await?)?)
            }
            GET_NETWORK_STATUS => {
                let request = parse_arguments(tool_name, arguments)?;
                Ok(serde_json::to_value(self.get_status(request).await?)?)
            }
            other => Err(StacksError::UnknownTool(other.to_string())),
        }
    }

    pub async fn get_block(&self, request: BlockRequest) -> Result<BlockResponse> {
        let block_id = required(request.block_id, "Block ID is required")?;
        let network = self.api.networks().resolve(request.network.as_deref());
        let block_ref = BlockRef::parse(&block_id);
        debug!("Fetching block {:?} on {}", block_ref, network);

        let block = self.api.get(network, &block_ref.endpoint()).await?;

        Ok(BlockResponse { network, block })
    }

    /// Core info and network info are required; PoX info is optional since
    /// not every network serves it.
    pub async fn get_status(&self, request: NetworkStatusRequest) -> Result<NetworkStatusResponse> {
        let network = self.api.networks().resolve(request.network.as_deref());
        info!("Fetching network status for {}", network);

        let (core_info, network_info, pox_info) = tokio::join!(
            self.api.get(network, "/v2/info"),
            self.api.get(network, "/extended/v2/network"),
            self.api.get(network, "/v2/pox"),
        );

        Ok(NetworkStatusResponse {
            network,
            status: NetworkStatus {
                core_info: core_info?,
                network_info: network_info?,
                pox_info: OptionalInfo::from_result("PoX info", pox_info),
            },
        })
    }
}
