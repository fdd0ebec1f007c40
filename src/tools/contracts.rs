use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::api::ApiClient;
use crate::config::NetworkSelector;
use crate::error::{Result, StacksError};
use crate::tools::{network_property, parse_arguments, required, ToolDefinition};

pub const CALL_READ_ONLY_FUNCTION: &str = "call_read_only_function";

/// Sender used when the caller supplies none.
pub const DEFAULT_SENDER: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOnlyCallRequest {
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub function_name: Option<String>,
    /// Clarity values, already hex/serialized by the caller.
    #[serde(default)]
    pub function_args: Option<Vec<String>>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ReadOnlyCallBody<'a> {
    sender: &'a str,
    arguments: &'a [String],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOnlyCallResponse {
    pub network: NetworkSelector,
    pub contract_id: String,
    pub function_name: String,
    pub function_args: Vec<String>,
    pub result: Value,
    pub success: bool,
}

pub struct ContractTools {
    api: ApiClient,
}

impl ContractTools {
    pub fn new(api: ApiClient) -> Self {
        ContractTools { api }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let default_network = self.api.networks().default_network();

        vec![ToolDefinition::new(
            CALL_READ_ONLY_FUNCTION,
            "Call a read-only function on a Stacks smart contract without creating a transaction",
            json!({
                "type": "object",
                "properties": {
                    "contractAddress": {
                        "type": "string",
                        "description": "The Stacks address of the contract (e.g., 'SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7')"
                    },
                    "contractName": {
                        "type": "string",
                        "description": "The name of the contract"
                    },
                    "functionName": {
                        "type": "string",
                        "description": "The name of the read-only function to call"
                    },
                    "functionArgs": {
                        "type": "array",
                        "description": "Function arguments as serialized Clarity values (hex strings, e.g. '0x0100000000000000000000000000000001' for u1)",
                        "items": { "type": "string" },
                        "default": []
                    },
                    "sender": {
                        "type": "string",
                        "description": "Optional sender address for the function call context",
                        "default": DEFAULT_SENDER
                    },
                    "network": network_property(default_network)
                },
                "required": ["contractAddress", "contractName", "functionName"]
            }),
        )]
    }

    pub async fn handle(&self, tool_name: &str, arguments: Value) -> Result<Value> {
        match tool_name {
            CALL_READ_ONLY_FUNCTION => {
                let request = parse_arguments(tool_name, arguments)?;
                Ok(serde_json::to_value(self.call_read_only(request).await?)?)
            }
            other => Err(StacksError::UnknownTool(other.to_string())),
        }
    }

    pub async fn call_read_only(&self, request: ReadOnlyCallRequest) -> Result<ReadOnlyCallResponse> {
        // 所有参数校验都在发起网络请求之前完成
        let contract_address = required(request.contract_address, "Contract address is required")?;
        let contract_name = required(request.contract_name, "Contract name is required")?;
        let function_name = required(request.function_name, "Function name is required")?;
        let function_args = request.function_args.unwrap_or_default();
        let sender = request
            .sender
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SENDER.to_string());
        let network = self.api.networks().resolve(request.network.as_deref());

        let contract_id = format!("{}.{}", contract_address, contract_name);
        info!(
            "Calling read-only {}::{} on {} ({} args)",
            contract_id,
            function_name,
            network,
            function_args.len()
        );

        let body = serde_json::to_value(ReadOnlyCallBody {
            sender: &sender,
            arguments: &function_args,
        })?;
        let result = self
            .api
            .post(
                network,
                &format!("/v2/contracts/call-read/{}/{}", contract_id, function_name),
                body,
            )
            .await?;

        Ok(ReadOnlyCallResponse {
            network,
            contract_id,
            function_name,
            function_args,
            result,
            success: true,
        })
    }
}
