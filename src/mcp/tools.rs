//! MCP tool implementations: map tool calls onto the explorer.

use std::path::{Component, Path, PathBuf};

use serde_json::{json, Value};

use super::types::{OutlineResponse, RefreshResponse, ToolDefinition, ToolsCallResult};
use crate::error::{CompassError, Result};
use crate::tree::{ApiExplorer, NodeView, TreeNode};

pub fn list_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "api_files",
            description: "List source files that declare HTTP endpoints, sorted by file name, \
                with an endpoint count for each.",
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDefinition {
            name: "api_endpoints",
            description: "List the HTTP endpoints declared in one file (method, path, \
                description, line), ordered GET, POST, PUT, PATCH, DELETE then by path.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file": {
                        "type": "string",
                        "description": "File path, absolute or relative to the workspace root"
                    }
                },
                "required": ["file"]
            }),
        },
        ToolDefinition {
            name: "api_refresh",
            description: "Discard the cached endpoint outline and rescan the workspace.",
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

pub fn call_tool(explorer: &ApiExplorer, name: &str, arguments: &Value) -> ToolsCallResult {
    match name {
        "api_files" => handle_files(explorer),
        "api_endpoints" => handle_endpoints(explorer, arguments),
        "api_refresh" => handle_refresh(explorer),
        _ => ToolsCallResult::error(format!("Unknown tool: {}", name)),
    }
}

fn handle_files(explorer: &ApiExplorer) -> ToolsCallResult {
    ToolsCallResult::json(&outline(explorer, &explorer.root_nodes()))
}

fn handle_endpoints(explorer: &ApiExplorer, args: &Value) -> ToolsCallResult {
    let Some(file) = args.get("file").and_then(|v| v.as_str()) else {
        return ToolsCallResult::error("Missing required parameter: file".to_string());
    };
    let Some(root) = explorer.workspace_root() else {
        return ToolsCallResult::error("No workspace root is open".to_string());
    };
    match resolve(root, file) {
        Ok(path) => ToolsCallResult::json(&outline(explorer, &explorer.endpoints_for(&path))),
        Err(e) => ToolsCallResult::error(e.to_string()),
    }
}

fn handle_refresh(explorer: &ApiExplorer) -> ToolsCallResult {
    let generation = explorer.refresh();
    let files = explorer.root_nodes().len();
    ToolsCallResult::json(&RefreshResponse { generation, files })
}

fn outline(explorer: &ApiExplorer, nodes: &[TreeNode]) -> OutlineResponse {
    OutlineResponse {
        count: nodes.len(),
        generation: explorer.generation(),
        nodes: nodes.iter().map(NodeView::from).collect(),
    }
}

/// Resolve `file` against the workspace root, refusing anything outside it.
fn resolve(root: &Path, file: &str) -> Result<PathBuf> {
    let root = root.canonicalize().unwrap_or_else(|_| normalize(root));
    let joined = normalize(&root.join(file));
    let path = joined.canonicalize().unwrap_or(joined);
    if path.starts_with(&root) {
        Ok(path)
    } else {
        Err(CompassError::OutsideWorkspace(PathBuf::from(file)))
    }
}

/// Lexically fold `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
