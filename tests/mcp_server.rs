use mockito::{Matcher, Server};
use serde_json::{json, Value};
use stacks_mcp_server::server::{serve_lines, JsonRpcRequest};
use stacks_mcp_server::{Config, McpServer};
use std::collections::HashMap;

fn mocknet_server(url: &str, api_key: Option<&str>) -> McpServer {
    let mut vars: HashMap<&str, String> = HashMap::new();
    vars.insert("STACKS_NETWORK", "mocknet".to_string());
    vars.insert("HIRO_MOCKNET_API_URL", url.to_string());
    vars.insert("MCP_SERVER_TIMEOUT", "2000".to_string());
    if let Some(key) = api_key {
        vars.insert("HIRO_API_KEY", key.to_string());
    }
    let config = Config::from_lookup(|key| vars.get(key).cloned());
    McpServer::new(config).unwrap()
}

fn tool_call(id: u64, name: &str, arguments: Value) -> JsonRpcRequest {
    serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    }))
    .unwrap()
}

fn tool_payload(result: &Value) -> Value {
    let text = result["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn test_network_status_over_default_network() {
    let mut api = Server::new_async().await;
    let info = api
        .mock("GET", "/v2/info")
        .match_header("x-api-key", "test-key")
        .with_status(200)
        .with_body(r#"{"burn_block_height": 100, "stacks_tip_height": 42}"#)
        .create_async()
        .await;
    let network = api
        .mock("GET", "/extended/v2/network")
        .with_status(200)
        .with_body(r#"{"network_id": 2147483648}"#)
        .create_async()
        .await;
    let pox = api
        .mock("GET", "/v2/pox")
        .with_status(404)
        .with_body(r#"{"error": "not found"}"#)
        .create_async()
        .await;

    let server = mocknet_server(&api.url(), Some("test-key"));
    let response = server
        .handle_request(tool_call(1, "get_network_status", json!({})))
        .await
        .unwrap();

    let result = response.result.unwrap();
    assert!(result.get("isError").is_none());
    let payload = tool_payload(&result);
    assert_eq!(payload["network"], json!("mocknet"));
    assert_eq!(payload["status"]["coreInfo"]["stacks_tip_height"], json!(42));
    assert_eq!(payload["status"]["poxInfo"], json!("Not available"));

    info.assert_async().await;
    network.assert_async().await;
    pox.assert_async().await;
}

#[tokio::test]
async fn test_read_only_call_end_to_end() {
    let mut api = Server::new_async().await;
    let call = api
        .mock(
            "POST",
            "/v2/contracts/call-read/SP000000000000000000002Q6VF78/pox-4/get-pox-info",
        )
        .match_header("x-api-key", Matcher::Missing)
        .match_body(Matcher::Json(json!({
            "sender": "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7",
            "arguments": []
        })))
        .with_status(200)
        .with_body(r#"{"okay": true, "result": "0x0701"}"#)
        .create_async()
        .await;

    let server = mocknet_server(&api.url(), None);
    let response = server
        .handle_request(tool_call(
            2,
            "call_read_only_function",
            json!({
                "contractAddress": "SP000000000000000000002Q6VF78",
                "contractName": "pox-4",
                "functionName": "get-pox-info"
            }),
        ))
        .await
        .unwrap();

    let payload = tool_payload(&response.result.unwrap());
    assert_eq!(payload["contractId"], json!("SP000000000000000000002Q6VF78.pox-4"));
    assert_eq!(payload["result"]["result"], json!("0x0701"));
    call.assert_async().await;
}

#[tokio::test]
async fn test_check_api_status_reports_rate_limits() {
    let mut api = Server::new_async().await;
    let probe = api
        .mock("GET", "/v2/info")
        .with_status(200)
        .with_header("x-ratelimit-limit", "500")
        .with_header("x-ratelimit-remaining", "499")
        .with_body("{}")
        .create_async()
        .await;

    let server = mocknet_server(&api.url(), Some("test-key"));
    let response = server
        .handle_request(tool_call(3, "check_api_status", json!({})))
        .await
        .unwrap();

    let payload = tool_payload(&response.result.unwrap());
    assert_eq!(payload["apiKey"]["configured"], json!(true));
    assert_eq!(payload["configuration"]["timeout"], json!("2000ms"));
    assert_eq!(payload["configuration"]["defaultNetwork"], json!("mocknet"));
    assert_eq!(payload["rateLimits"]["testResult"], json!("API accessible"));
    assert_eq!(payload["rateLimits"]["limit"], json!("500"));
    assert_eq!(payload["rateLimits"]["remaining"], json!("499"));
    assert_eq!(payload["rateLimits"]["reset"], json!("Unknown"));
    probe.assert_async().await;
}

#[tokio::test]
async fn test_line_session() {
    let api = Server::new_async().await;
    let server = mocknet_server(&api.url(), None);

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "resources/read", "params": {"uri": "stacks://networks"}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"name": "get_account_balance", "arguments": {"address": ""}}}),
    ]
    .iter()
    .map(|request| format!("{}\n", request))
    .collect::<String>();

    let mut output: Vec<u8> = Vec::new();
    serve_lines(input.as_bytes(), &mut output, &server)
        .await
        .unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses.len(), 4);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], json!("Stacks MCP Server"));
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 8);

    let networks: Value =
        serde_json::from_str(responses[2]["result"]["contents"][0]["text"].as_str().unwrap())
            .unwrap();
    assert_eq!(networks["networks"][2]["url"], json!(api.url()));

    assert_eq!(responses[3]["id"], json!(4));
    assert_eq!(responses[3]["result"]["isError"], json!(true));
    assert_eq!(
        responses[3]["result"]["content"][0]["text"],
        json!("Error: Address is required")
    );
}
