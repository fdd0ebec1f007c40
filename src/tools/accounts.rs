use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::config::NetworkSelector;
use crate::error::{Result, StacksError};
use crate::tools::{network_property, parse_arguments, required, ToolDefinition};

pub const GENERATE_ACCOUNT: &str = "generate_account";
pub const GET_ACCOUNT_BALANCE: &str = "get_account_balance";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateAccountRequest {
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAccount {
    pub network: NetworkSelector,
    pub private_key: String,
    pub warning: String,
    pub note: String,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: String,
    pub network: NetworkSelector,
    pub balance: Value,
}

/// 32 bytes from the OS RNG as 64 lowercase hex characters.
pub fn generate_private_key() -> String {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    hex::encode(key)
}

pub struct AccountTools {
    api: ApiClient,
}

impl AccountTools {
    pub fn new(api: ApiClient) -> Self {
        AccountTools { api }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let default_network = self.api.networks().default_network();
        let mut generate_network = network_property(default_network);
        generate_network["description"] = json!("Network type for address generation");

        vec![
            ToolDefinition::new(
                GENERATE_ACCOUNT,
                "Generate a new Stacks account with private key and basic info",
                json!({
                    "type": "object",
                    "properties": {
                        "network": generate_network
                    }
                }),
            ),
            ToolDefinition::new(
                GET_ACCOUNT_BALANCE,
                "Get STX balance and account information for a Stacks address",
                json!({
                    "type": "object",
                    "properties": {
                        "address": {
                            "type": "string",
                            "description": "Stacks address to check balance for"
                        },
                        "network": network_property(default_network)
                    },
                    "required": ["address"]
                }),
            ),
        ]
    }

    pub async fn handle(&self, tool_name: &str, arguments: Value) -> Result<Value> {
        match tool_name {
            GENERATE_ACCOUNT => {
                let request = parse_arguments(tool_name, arguments)?;
                Ok(serde_json::to_value(self.generate_account(request))?)
            }
            GET_ACCOUNT_BALANCE => {
                let request = parse_arguments(tool_name, arguments)?;
                Ok(serde_json::to_value(self.get_balance(request).await?)?)
            }
            other => Err(StacksError::UnknownTool(other.to_string())),
        }
    }

    /// Key material only; public key and address derivation happen elsewhere.
    pub fn generate_account(&self, request: GenerateAccountRequest) -> GeneratedAccount {
        let network = self.api.networks().resolve(request.network.as_deref());
        info!("Generating account key for {}", network);

        GeneratedAccount {
            network,
            private_key: generate_private_key(),
            warning: "This is a simplified account generation. For production use, please use proper Stacks key derivation to obtain the public key and address.".to_string(),
            note: "Keep your private key secure! Never share it with anyone.".to_string(),
            next_steps: vec![
                "Use a Stacks library to derive the public key and address from this private key".to_string(),
                "Fund the account on testnet using the testnet faucet".to_string(),
                "Use get_account_balance to check the balance".to_string(),
            ],
        }
    }

    pub async fn get_balance(&self, request: BalanceRequest) -> Result<BalanceResponse> {
        let address = required(request.address, "Address is required")?;
        let network = self.api.networks().resolve(request.network.as_deref());
        debug!("Fetching balances for {} on {}", address, network);

        let balance = self
            .api
            .get(network, &format!("/extended/v1/address/{}/balances", address))
            .await?;

        Ok(BalanceResponse {
            address,
            network,
            balance,
        })
    }
}
