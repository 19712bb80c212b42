//! API Compass MCP Server: the endpoint outline for AI agents.
//!
//! Runs a JSON-RPC 2.0 server over STDIO exposing the outline through the
//! Model Context Protocol.
//!
//! Usage:
//!   api-compass-mcp [project_root]
//!
//! If no project root is given, uses the current working directory.
//! A file watcher keeps the outline current while the server runs.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

fn main() {
    // stdout carries the protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let project_root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok());

    let explorer = match project_root {
        Some(root) => {
            info!(root = %root.display(), "API Compass MCP server starting");
            Arc::new(api_compass::ApiExplorer::open(root))
        }
        None => {
            tracing::warn!("no workspace root, serving an empty outline");
            Arc::new(api_compass::ApiExplorer::new(None, Default::default()))
        }
    };

    let _watcher = match api_compass::watcher::start_watching(&explorer) {
        Ok(handle) => {
            info!("file watcher active, outline refreshes on change");
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "file watcher failed to start, outline refreshes only on request");
            None
        }
    };

    info!("MCP server ready, waiting for JSON-RPC requests on stdin");
    api_compass::mcp::server::run(explorer);
}
