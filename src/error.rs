use thiserror::Error;

#[derive(Error, Debug)]
pub enum StacksError {
    /// A tool argument is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The remote API answered with a non-2xx status.
    #[error("{message}")]
    RemoteStatus { status: u16, message: String },

    #[error("API call timeout after {timeout_ms}ms: {url}")]
    Timeout { timeout_ms: u64, url: String },

    /// Transport fault, carrying the underlying message unchanged.
    #[error("{0}")]
    Transport(String),

    #[error("Unknown error during API call to {url}")]
    Unknown { url: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Resource {0} not found")]
    UnknownResource(String),

    #[error("Invalid resource URI: {0}")]
    InvalidUri(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StacksError {
    pub fn validation(message: impl Into<String>) -> Self {
        StacksError::Validation(message.into())
    }

    /// True for faults raised by the remote API or the network path to it.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            StacksError::RemoteStatus { .. }
                | StacksError::Timeout { .. }
                | StacksError::Transport(_)
                | StacksError::Unknown { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StacksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_bound_and_url() {
        let err = StacksError::Timeout {
            timeout_ms: 250,
            url: "https://api.testnet.hiro.so/v2/info".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API call timeout after 250ms: https://api.testnet.hiro.so/v2/info"
        );
        assert!(err.is_remote());
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = StacksError::validation("Function name is required");
        assert_eq!(err.to_string(), "Function name is required");
        assert!(!err.is_remote());
    }

    #[test]
    fn test_unknown_tool_message() {
        let err = StacksError::UnknownTool("mint_tokens".to_string());
        assert_eq!(err.to_string(), "Unknown tool: mint_tokens");
    }
}
