pub mod api;
pub mod config;
pub mod error;
pub mod network;
pub mod server;
pub mod tools;

pub use api::ApiClient;
pub use config::{Config, NetworkSelector};
pub use error::{Result, StacksError};
pub use network::NetworkRegistry;
pub use server::McpServer;
pub use tools::ToolRegistry;
