use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{Result, StacksError};
use crate::tools::{
    AccountTools, ContractTools, InternalTools, NetworkTools, ToolDefinition, ToolInvocation,
    ToolResult, TransactionTools,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolGroup {
    Accounts,
    Transactions,
    Network,
    Contracts,
    Internal,
}

/// Advertised tool catalog plus the name → handler mapping behind it.
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
    handlers: HashMap<String, ToolGroup>,
    accounts: AccountTools,
    transactions: TransactionTools,
    network: NetworkTools,
    contracts: ContractTools,
    internal: InternalTools,
}

impl ToolRegistry {
    pub fn new(config: &Config, api: ApiClient) -> Self {
        let accounts = AccountTools::new(api.clone());
        let transactions = TransactionTools::new(api.clone());
        let network = NetworkTools::new(api.clone());
        let contracts = ContractTools::new(api.clone());
        let internal = InternalTools::new(config.clone(), api);

        // Handlers are keyed from the same definitions that get advertised.
        let groups = [
            (ToolGroup::Accounts, accounts.definitions()),
            (ToolGroup::Transactions, transactions.definitions()),
            (ToolGroup::Network, network.definitions()),
            (ToolGroup::Contracts, contracts.definitions()),
            (ToolGroup::Internal, internal.definitions()),
        ];

        let mut definitions = Vec::new();
        let mut handlers = HashMap::new();
        for (group, group_definitions) in groups {
            for definition in group_definitions {
                if handlers.insert(definition.name.clone(), group).is_some() {
                    warn!("Duplicate tool definition ignored: {}", definition.name);
                    continue;
                }
                definitions.push(definition);
            }
        }

        info!("Registered {} tools", definitions.len());

        ToolRegistry {
            definitions,
            handlers,
            accounts,
            transactions,
            network,
            contracts,
            internal,
        }
    }

    /// Tool catalog in registration order.
    pub fn list_tools(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Run a tool; every failure comes back as an error result.
    pub async fn invoke(&self, invocation: ToolInvocation) -> ToolResult {
        let ToolInvocation { name, arguments } = invocation;
        debug!("Invoking tool {} with arguments: {}", name, arguments);

        let outcome = match self.handlers.get(&name) {
            Some(group) => self.dispatch(*group, &name, arguments).await,
            None => Err(StacksError::UnknownTool(name.clone())),
        };

        match outcome.and_then(|payload| ToolResult::from_payload(&payload)) {
            Ok(result) => result,
            Err(e) => {
                if e.is_remote() {
                    warn!("Tool {} failed: {}", name, e);
                } else {
                    debug!("Tool {} rejected: {}", name, e);
                }
                ToolResult::error(&e.to_string())
            }
        }
    }

    async fn dispatch(&self, group: ToolGroup, name: &str, arguments: Value) -> Result<Value> {
        match group {
            ToolGroup::Accounts => self.accounts.handle(name, arguments).await,
            ToolGroup::Transactions => self.transactions.handle(name, arguments).await,
            ToolGroup::Network => self.network.handle(name, arguments).await,
            ToolGroup::Contracts => self.contracts.handle(name, arguments).await,
            ToolGroup::Internal => self.internal.handle(name, arguments).await,
        }
    }
}
