use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::StacksError;
use crate::server::prompts;
use crate::server::resources::ResourceCatalog;
use crate::tools::{ToolInvocation, ToolRegistry};

pub const SERVER_NAME: &str = "Stacks MCP Server";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Standard JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// JSON-RPC 2.0 Request format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    /// Absent for notifications; an explicit `null` is still a request id.
    #[serde(
        default,
        deserialize_with = "present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
}

fn jsonrpc_version() -> String {
    "2.0".to_string()
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 Response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        JsonRpcError {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, error: JsonRpcError) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// MCP Server for Stacks blockchain queries
pub struct McpServer {
    config: Config,
    tools: ToolRegistry,
    resources: ResourceCatalog,
}

impl McpServer {
    pub fn new(config: Config) -> crate::error::Result<Self> {
        info!(
            "Initializing MCP server (default network: {}, API: {})",
            config.default_network,
            config.base_url(config.default_network)
        );

        let api = ApiClient::new(&config)?;
        let tools = ToolRegistry::new(&config, api.clone());
        let resources = ResourceCatalog::new(api);

        Ok(McpServer {
            config,
            tools,
            resources,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handle a JSON-RPC request; notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(
            "Handling MCP request: {} with params: {}",
            request.method, request.params
        );

        let id = match request.id {
            Some(id) if !request.method.starts_with("notifications/") => id,
            _ => {
                debug!("Notification received: {}", request.method);
                return None;
            }
        };

        let response = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize(&request.params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tools.list_tools() })),
            "tools/call" => self.handle_tool_call(request.params).await,
            "prompts/list" => Ok(json!({ "prompts": prompts::list_prompts() })),
            "prompts/get" => self.handle_prompt_get(&request.params),
            "resources/list" => Ok(json!({ "resources": self.resources.list() })),
            "resources/read" => self.handle_resource_read(&request.params).await,
            _ => Err(JsonRpcError::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        Some(match response {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::error(id, err),
        })
    }

    fn handle_initialize(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(|v| v.as_str())
            .unwrap_or(PROTOCOL_VERSION);

        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": {},
                "prompts": {},
                "resources": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn handle_tool_call(&self, params: Value) -> Result<Value, JsonRpcError> {
        let invocation: ToolInvocation = serde_json::from_value(params).map_err(|e| {
            JsonRpcError::new(
                error_codes::INVALID_PARAMS,
                format!("Invalid tool call parameters: {}", e),
            )
        })?;

        let result = self.tools.invoke(invocation).await;
        serde_json::to_value(&result).map_err(|e| {
            JsonRpcError::new(error_codes::INTERNAL_ERROR, format!("Internal error: {}", e))
        })
    }

    fn handle_prompt_get(&self, params: &Value) -> Result<Value, JsonRpcError> {
        let name = string_param(params, "name")?;

        let prompt = prompts::get_prompt(name)
            .map_err(|e| JsonRpcError::new(error_codes::INVALID_PARAMS, e.to_string()))?;
        serde_json::to_value(prompt).map_err(|e| {
            JsonRpcError::new(error_codes::INTERNAL_ERROR, format!("Internal error: {}", e))
        })
    }

    async fn handle_resource_read(&self, params: &Value) -> Result<Value, JsonRpcError> {
        let uri = string_param(params, "uri")?;

        match self.resources.read(uri).await {
            Ok(contents) => Ok(json!({ "contents": contents })),
            Err(e) => {
                warn!("Failed to read resource {}: {}", uri, e);
                let code = match &e {
                    StacksError::UnknownResource(_) | StacksError::InvalidUri(_) => {
                        error_codes::INVALID_PARAMS
                    }
                    _ => error_codes::INTERNAL_ERROR,
                };
                Err(JsonRpcError::new(
                    code,
                    format!("Failed to fetch resource: {}", e),
                ))
            }
        }
    }
}

fn string_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, JsonRpcError> {
    params.get(key).and_then(|v| v.as_str()).ok_or_else(|| {
        JsonRpcError::new(
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid '{}' parameter", key),
        )
    })
}
