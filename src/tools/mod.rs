pub mod accounts;
pub mod contracts;
pub mod internal;
pub mod network;
pub mod registry;
pub mod transactions;

pub use accounts::AccountTools;
pub use contracts::ContractTools;
pub use internal::InternalTools;
pub use network::NetworkTools;
pub use registry::ToolRegistry;
pub use transactions::TransactionTools;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::NetworkSelector;
use crate::error::{Result, StacksError};

/// MCP Tool Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: &str, description: &str, input_schema: Value) -> Self {
        ToolDefinition {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Standard tool request format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        ToolInvocation {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// Standard tool response format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: String) -> Self {
        ToolResult {
            content: vec![ContentBlock::Text { text }],
            is_error: false,
        }
    }

    pub fn error(message: &str) -> Self {
        ToolResult {
            content: vec![ContentBlock::Text {
                text: format!("Error: {}", message),
            }],
            is_error: true,
        }
    }

    /// Pretty-printed JSON payload as a single text block.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        Ok(Self::success(serde_json::to_string_pretty(payload)?))
    }

    #[cfg(test)]
    pub(crate) fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Decode raw tool arguments into a typed request; absent arguments decode
/// to the request's default.
pub(crate) fn parse_arguments<T>(tool: &str, arguments: Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if arguments.is_null() {
        return Ok(T::default());
    }

    serde_json::from_value(arguments)
        .map_err(|e| StacksError::validation(format!("Invalid arguments for {}: {}", tool, e)))
}

/// Blank strings count as missing.
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StacksError::validation(message))
}

pub(crate) fn network_property(default_network: NetworkSelector) -> Value {
    json!({
        "type": "string",
        "enum": ["mainnet", "testnet", "mocknet"],
        "description": "Network to query",
        "default": default_network.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Probe {
        address: Option<String>,
        limit: Option<u32>,
    }

    #[test]
    fn test_tool_result_serialization() {
        let ok = serde_json::to_value(ToolResult::success("{}".to_string())).unwrap();
        assert_eq!(ok, json!({"content": [{"type": "text", "text": "{}"}]}));

        let failed = serde_json::to_value(ToolResult::error("Address is required")).unwrap();
        assert_eq!(
            failed,
            json!({
                "content": [{"type": "text", "text": "Error: Address is required"}],
                "isError": true
            })
        );
    }

    #[test]
    fn test_null_arguments_decode_to_default() {
        let probe: Probe = parse_arguments("probe", Value::Null).unwrap();
        assert!(probe.address.is_none());
        assert!(probe.limit.is_none());
    }

    #[test]
    fn test_mistyped_arguments_are_validation_errors() {
        let err = parse_arguments::<Probe>("probe", json!({"limit": "ten"})).unwrap_err();
        assert!(matches!(err, StacksError::Validation(_)));
        assert!(err.to_string().starts_with("Invalid arguments for probe:"));
    }

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(
            required(Some(" SP123 ".to_string()), "Address is required").unwrap(),
            "SP123"
        );
        let err = required(Some("   ".to_string()), "Address is required").unwrap_err();
        assert_eq!(err.to_string(), "Address is required");
        assert!(required(None, "Address is required").is_err());
    }

    #[test]
    fn test_invocation_without_arguments() {
        let invocation: ToolInvocation =
            serde_json::from_value(json!({"name": "generate_account"})).unwrap();
        assert!(invocation.arguments.is_null());
    }
}
