use serde::{Deserialize, Serialize};

use crate::error::{Result, StacksError};
use crate::tools::ContentBlock;

pub const STACKS_OVERVIEW: &str = "stacks_overview";
pub const GETTING_STARTED_GUIDE: &str = "getting_started_guide";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: ContentBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResult {
    pub description: String,
    pub messages: Vec<PromptMessage>,
}

const OVERVIEW_DESCRIPTION: &str =
    "Get an overview of Stacks blockchain capabilities available through this MCP server";
const GETTING_STARTED_DESCRIPTION: &str =
    "Get a guide on how to start using Stacks blockchain features";

const OVERVIEW_TEXT: &str = r#"This Stacks MCP Server provides the following blockchain capabilities:

## Account Management
- Generate new private keys for Stacks accounts
- Check STX balances and account information
- Support for mainnet, testnet, and mocknet

## Network Information
- Get network status and blockchain info
- Query block information by height or hash
- Check API key status and rate limits

## Transaction Queries
- Query transaction status and details by transaction ID
- Search transactions by address
- Get transaction history

## Smart Contract Interactions
- Call read-only functions on smart contracts without fees
- Query contract state and public data
- Support for function arguments and custom sender addresses

## Getting Started
1. Use 'generate_account' to create a new private key
2. Use 'get_account_balance' to check balances
3. Use 'get_network_status' to check network health
4. Use 'call_read_only_function' to interact with smart contracts
5. Use 'search_transactions' to find transaction history

All operations support multiple networks (mainnet/testnet/mocknet) and provide detailed JSON responses.

Note: This server only queries blockchain data and calls read-only contract functions. It never signs or broadcasts transactions."#;

const GETTING_STARTED_TEXT: &str = r#"## Getting Started with Stacks MCP Server

### 1. Check Network Status
Start by checking if the network is healthy:
```
get_network_status(network: "testnet")
```

### 2. Generate an Account
Create a new private key for testing:
```
generate_account(network: "testnet")
```

### 3. Fund Your Account
- For testnet: Use the Stacks testnet faucet
- Visit: https://explorer.hiro.so/sandbox/faucet
- Enter your testnet address to receive test STX

### 4. Check Your Balance
```
get_account_balance(address: "your_address", network: "testnet")
```

### 5. Call Smart Contract Functions
```
call_read_only_function(
  contractAddress: "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7",
  contractName: "my-contract",
  functionName: "get-balance",
  functionArgs: ["0x0516..."],
  network: "testnet"
)
```

### 6. Explore Blockchain Data
- View blocks: `get_block_info(blockId: "123", network: "testnet")`
- Search transactions: `search_transactions(address: "your_address", network: "testnet")`

### Important Notes
- Always use testnet for development and testing
- Keep private keys secure and never share them
- Read-only functions can be called without fees or transactions
- Function arguments must be serialized Clarity values
- Set HIRO_API_KEY for higher rate limits"#;

pub fn list_prompts() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition {
            name: STACKS_OVERVIEW.to_string(),
            description: OVERVIEW_DESCRIPTION.to_string(),
        },
        PromptDefinition {
            name: GETTING_STARTED_GUIDE.to_string(),
            description: GETTING_STARTED_DESCRIPTION.to_string(),
        },
    ]
}

pub fn get_prompt(name: &str) -> Result<PromptResult> {
    let (description, text) = match name {
        STACKS_OVERVIEW => (OVERVIEW_DESCRIPTION, OVERVIEW_TEXT),
        GETTING_STARTED_GUIDE => (GETTING_STARTED_DESCRIPTION, GETTING_STARTED_TEXT),
        other => return Err(StacksError::UnknownPrompt(other.to_string())),
    };

    Ok(PromptResult {
        description: description.to_string(),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: ContentBlock::Text {
                text: text.to_string(),
            },
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_catalog() {
        let names: Vec<_> = list_prompts().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec![STACKS_OVERVIEW, GETTING_STARTED_GUIDE]);
    }

    #[test]
    fn test_every_listed_prompt_resolves() {
        for prompt in list_prompts() {
            let result = get_prompt(&prompt.name).unwrap();
            assert_eq!(result.description, prompt.description);
            assert_eq!(result.messages.len(), 1);
            assert_eq!(result.messages[0].role, "user");
        }
    }

    #[test]
    fn test_unknown_prompt() {
        let err = get_prompt("deploy_contract").unwrap_err();
        assert_eq!(err.to_string(), "Unknown prompt: deploy_contract");
    }
}
