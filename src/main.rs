use stacks_mcp_server::config::parse_flag;
use stacks_mcp_server::server::serve_lines;
use stacks_mcp_server::{Config, McpServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing; stdout carries protocol traffic, so logs go to stderr
    let default_level = if parse_flag(std::env::var("DEBUG").ok().as_deref()) {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting Stacks MCP Server...");

    // Load configuration from environment
    let config = Config::from_env();

    let mcp_server = match McpServer::new(config) {
        Ok(server) => Arc::new(server),
        Err(e) => {
            error!("Failed to initialize MCP server: {}", e);
            return Err(e.into());
        }
    };

    let tool_names: Vec<&str> = mcp_server
        .tools()
        .list_tools()
        .iter()
        .map(|tool| tool.name.as_str())
        .collect();
    info!("Available tools: {}", tool_names.join(", "));

    match std::env::var("STACKS_MCP_LISTEN") {
        Ok(listen) if !listen.trim().is_empty() => serve_tcp(listen.trim(), mcp_server).await,
        _ => {
            info!(
                "Serving MCP over stdio (default network: {})",
                mcp_server.config().default_network
            );
            serve_lines(tokio::io::stdin(), tokio::io::stdout(), &mcp_server).await?;
            info!("stdin closed, shutting down");
            Ok(())
        }
    }
}

async fn serve_tcp(listen: &str, mcp_server: Arc<McpServer>) -> eyre::Result<()> {
    let addr: SocketAddr = listen.parse()?;
    let listener = TcpListener::bind(&addr).await?;

    info!("MCP server listening on {}", addr);

    loop {
        let (socket, peer_addr) = listener.accept().await?;
        let mcp_server = Arc::clone(&mcp_server);

        tokio::spawn(async move {
            let (reader, writer) = socket.into_split();
            if let Err(e) = serve_lines(reader, writer, &mcp_server).await {
                error!("Error handling connection from {}: {}", peer_addr, e);
            }
        });
    }
}
