use serde_json::Value;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{error, info};

use crate::server::mcp::{error_codes, JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer};

/// Serve newline-delimited JSON-RPC until the reader hits EOF.
///
/// A malformed line is answered with a parse error; only I/O failures end
/// the session.
pub async fn serve_lines<R, W>(reader: R, mut writer: W, server: &McpServer) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf_reader = BufReader::new(reader);
    let mut line = Vec::new();

    while buf_reader.read_until(b'\n', &mut line).await? > 0 {
        let response = match std::str::from_utf8(&line) {
            Ok(text) if text.trim().is_empty() => None,
            Ok(text) => handle_line(text.trim(), server).await,
            Err(e) => {
                error!("Request line is not valid UTF-8: {}", e);
                Some(parse_error(e.to_string()))
            }
        };

        if let Some(response) = response {
            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        line.clear();
    }

    Ok(())
}

async fn handle_line(text: &str, server: &McpServer) -> Option<JsonRpcResponse> {
    // Parse JSON-RPC request
    match serde_json::from_str::<JsonRpcRequest>(text) {
        Ok(request) => {
            info!("Received request: {} (id: {:?})", request.method, request.id);
            server.handle_request(request).await
        }
        Err(e) => {
            error!("Failed to parse JSON-RPC request: {}", e);
            Some(parse_error(e.to_string()))
        }
    }
}

fn parse_error(detail: String) -> JsonRpcResponse {
    JsonRpcResponse::error(
        Value::Null,
        JsonRpcError {
            code: error_codes::PARSE_ERROR,
            message: "Parse error".to_string(),
            data: Some(Value::String(detail)),
        },
    )
}
