//! MCP JSON-RPC 2.0 server over STDIO.
//!
//! Requests and responses are newline-delimited JSON on stdin/stdout.
//! Tracing goes to stderr so it never corrupts the protocol stream.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::tools;
use super::types::*;
use crate::tree::ApiExplorer;

/// Serve requests from stdin until it closes.
pub fn run(explorer: Arc<ApiExplorer>) {
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(&explorer, stdin.lock(), &mut stdout.lock());
}

/// Serve requests from any line source; used by `run` and by tests.
pub fn serve(explorer: &ApiExplorer, input: impl BufRead, output: &mut impl Write) {
    info!("MCP server starting");

    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, "failed to read stdin");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(request = %trimmed, "received request");

        let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) => handle_request(explorer, &request),
            Err(e) => {
                warn!(error = %e, "invalid JSON-RPC request");
                Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        };

        if let Some(response) = response {
            write_response(output, &response);
        }
    }

    info!("MCP server shutting down");
}

/// Handle one request; notifications get no response.
fn handle_request(explorer: &ApiExplorer, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    let id = request.id.clone();

    match request.method.as_str() {
        "initialize" => {
            info!("client initializing");
            let result = InitializeResult {
                protocol_version: PROTOCOL_VERSION,
                capabilities: json!({ "tools": {} }),
                server_info: ServerInfo {
                    name: "api-compass",
                    version: env!("CARGO_PKG_VERSION"),
                },
            };
            Some(respond(id, &result))
        }

        "notifications/initialized" => {
            info!("client initialized");
            None
        }

        "tools/list" => Some(respond(id, &json!({ "tools": tools::list_tools() }))),

        "tools/call" => {
            let params: ToolsCallParams = match serde_json::from_value(request.params.clone()) {
                Ok(p) => p,
                Err(e) => {
                    return Some(JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        format!("Invalid params: {}", e),
                    ));
                }
            };
            debug!(tool = %params.name, "calling tool");
            let result = tools::call_tool(explorer, &params.name, &params.arguments);
            Some(respond(id, &result))
        }

        "ping" => Some(JsonRpcResponse::success(id, json!({}))),

        _ => {
            warn!(method = %request.method, "unknown method");
            Some(JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ))
        }
    }
}

fn respond(id: Option<Value>, result: &impl serde::Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, -32603, format!("Internal error: {}", e)),
    }
}

fn write_response(output: &mut impl Write, response: &JsonRpcResponse) {
    let json = serde_json::to_string(response).unwrap_or_default();
    debug!(response = %json, "sending response");
    let _ = writeln!(output, "{}", json);
    let _ = output.flush();
}
