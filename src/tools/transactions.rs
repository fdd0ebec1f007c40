use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::api::ApiClient;
use crate::config::NetworkSelector;
use crate::error::{Result, StacksError};
use crate::tools::{network_property, parse_arguments, required, ToolDefinition};

pub const GET_TRANSACTION_INFO: &str = "get_transaction_info";
pub const SEARCH_TRANSACTIONS: &str = "search_transactions";

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(default)]
    pub tx_id: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub address: Option<String>,
    /// Any JSON number or numeric string; see [`search_limit`].
    #[serde(default)]
    pub limit: Option<Value>,
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub network: NetworkSelector,
    pub transaction: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub network: NetworkSelector,
    pub address: String,
    pub transactions: Value,
}

pub struct TransactionTools {
    api: ApiClient,
}

impl TransactionTools {
    pub fn new(api: ApiClient) -> Self {
        TransactionTools { api }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let default_network = self.api.networks().default_network();

        vec![
            ToolDefinition::new(
                GET_TRANSACTION_INFO,
                "Get information about a transaction by ID",
                json!({
                    "type": "object",
                    "properties": {
                        "txId": {
                            "type": "string",
                            "description": "Transaction ID to look up"
                        },
                        "network": network_property(default_network)
                    },
                    "required": ["txId"]
                }),
            ),
            ToolDefinition::new(
                SEARCH_TRANSACTIONS,
                "Search for transactions by address",
                json!({
                    "type": "object",
                    "properties": {
                        "address": {
                            "type": "string",
                            "description": "Address to search transactions for"
                        },
                        "limit": {
                            "type": "number",
                            "description": "Maximum number of transactions to return",
                            "default": DEFAULT_SEARCH_LIMIT
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
            GET_TRANSACTION_INFO => {
                let request = parse_arguments(tool_name, arguments)?;
                Ok(serde_json::to_value(self.get_transaction(request).await?)?)
            }
            SEARCH_TRANSACTIONS => {
                let request = parse_arguments(tool_name, arguments)?;
                Ok(serde_json::to_value(self.search(request).await?)?)
            }
            other => Err(StacksError::UnknownTool(other.to_string())),
        }
    }

    pub async fn get_transaction(&self, request: TransactionRequest) -> Result<TransactionResponse> {
        let tx_id = required(request.tx_id, "Transaction ID is required")?;
        let network = self.api.networks().resolve(request.network.as_deref());
        debug!("Fetching transaction {} on {}", tx_id, network);

        let transaction = self
            .api
            .get(network, &format!("/extended/v1/tx/{}", tx_id))
            .await?;

        Ok(TransactionResponse {
            network,
            transaction,
        })
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let address = required(request.address, "Address is required")?;
        let network = self.api.networks().resolve(request.network.as_deref());
        let limit = search_limit(request.limit.as_ref());
        debug!("Searching {} transactions for {} on {}", limit, address, network);

        let transactions = self
            .api
            .get(
                network,
                &format!("/extended/v1/address/{}/transactions?limit={}", address, limit),
            )
            .await?;

        Ok(SearchResponse {
            network,
            address,
            transactions,
        })
    }
}

/// Numbers and numeric strings are truncated to whole transactions; anything
/// non-numeric or below 1 falls back to [`DEFAULT_SEARCH_LIMIT`].
pub fn search_limit(raw: Option<&Value>) -> u32 {
    let requested = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    requested
        .filter(|limit| limit.is_finite() && *limit >= 1.0)
        .map(|limit| limit.min(u32::MAX as f64) as u32)
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use mockito::Matcher;

    fn tools_for(url: String) -> TransactionTools {
        TransactionTools::new(ApiClient::new(&Config::from_url(url)).unwrap())
    }

    #[tokio::test]
    async fn test_transaction_requires_id() {
        let tools = tools_for("http://127.0.0.1:9".to_string());
        let err = tools
            .handle(GET_TRANSACTION_INFO, json!({"network": "mainnet"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Transaction ID is required");
    }

    #[tokio::test]
    async fn test_transaction_lookup() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/extended/v1/tx/0xabc")
            .with_status(200)
            .with_body(r#"{"tx_id": "0xabc", "tx_status": "success"}"#)
            .create_async()
            .await;

        let tools = tools_for(server.url());
        let payload = tools
            .handle(GET_TRANSACTION_INFO, json!({"txId": "0xabc", "network": "mainnet"}))
            .await
            .unwrap();

        assert_eq!(payload["network"], json!("mainnet"));
        assert_eq!(payload["transaction"]["tx_status"], json!("success"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_uses_default_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/extended/v1/address/SP000/transactions")
            .match_query(Matcher::UrlEncoded("limit".into(), "10".into()))
            .with_status(200)
            .with_body(r#"{"total": 0, "results": []}"#)
            .create_async()
            .await;

        let tools = tools_for(server.url());
        let response = tools
            .search(SearchRequest {
                address: Some("SP000".to_string()),
                limit: None,
                network: None,
            })
            .await
            .unwrap();

        assert_eq!(response.address, "SP000");
        assert_eq!(response.transactions["total"], json!(0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_passes_explicit_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/extended/v1/address/SP000/transactions")
            .match_query(Matcher::UrlEncoded("limit".into(), "25".into()))
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let tools = tools_for(server.url());
        tools
            .handle(SEARCH_TRANSACTIONS, json!({"address": "SP000", "limit": 25}))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn test_search_limit_coercion() {
        assert_eq!(search_limit(None), DEFAULT_SEARCH_LIMIT);
        assert_eq!(search_limit(Some(&json!(25))), 25);
        assert_eq!(search_limit(Some(&json!(25.0))), 25);
        assert_eq!(search_limit(Some(&json!(7.9))), 7);
        assert_eq!(search_limit(Some(&json!("25"))), 25);
        assert_eq!(search_limit(Some(&json!(0))), DEFAULT_SEARCH_LIMIT);
        assert_eq!(search_limit(Some(&json!(-5))), DEFAULT_SEARCH_LIMIT);
        assert_eq!(search_limit(Some(&json!("lots"))), DEFAULT_SEARCH_LIMIT);
        assert_eq!(search_limit(Some(&json!(null))), DEFAULT_SEARCH_LIMIT);
        assert_eq!(search_limit(Some(&json!(true))), DEFAULT_SEARCH_LIMIT);
    }

    #[tokio::test]
    async fn test_search_accepts_float_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/extended/v1/address/SP000/transactions")
            .match_query(Matcher::UrlEncoded("limit".into(), "25".into()))
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let tools = tools_for(server.url());
        let payload = tools
            .handle(SEARCH_TRANSACTIONS, json!({"address": "SP000", "limit": 25.0}))
            .await
            .unwrap();
        assert_eq!(payload["address"], json!("SP000"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_requires_address() {
        let tools = tools_for("http://127.0.0.1:9".to_string());
        let err = tools.handle(SEARCH_TRANSACTIONS, json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "Address is required");
    }
}
