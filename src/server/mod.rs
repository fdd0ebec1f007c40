pub mod mcp;
pub mod prompts;
pub mod resources;
pub mod transport;

pub use mcp::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer};
pub use transport::serve_lines;
