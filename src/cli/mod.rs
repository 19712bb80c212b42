//! CLI module for API Compass.
//!
//! Commands:
//! - Outline: tree, files, endpoints
//! - Navigation: locate
//! - System: stats, watch

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::parser::HttpMethod;
use crate::tree::{qualify_with_stats, ApiExplorer, NavigationTarget, NodeView, TreeNode};

#[derive(Parser)]
#[command(name = "api-compass")]
#[command(about = "Browse the HTTP endpoints declared in a codebase")]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // ─── Outline ──────────────────────────────────────────────────
    /// Files with endpoints, each followed by its endpoints (default)
    Tree,

    /// Files with endpoints only
    Files,

    /// Endpoints declared in one file
    Endpoints {
        /// File path, absolute or relative to the root
        file: PathBuf,
    },

    // ─── Navigation ───────────────────────────────────────────────
    /// Print file:line for every declaration of METHOD PATH
    Locate {
        /// HTTP method (case-insensitive)
        method: String,

        /// Route path exactly as written in source
        path: String,
    },

    // ─── System ───────────────────────────────────────────────────
    /// Scan statistics
    Stats,

    /// Print the tree, then reprint it whenever watched files change
    Watch,
}

/// Write the full two-level outline.
pub fn render_tree(explorer: &ApiExplorer, out: &mut impl Write) -> io::Result<()> {
    let files = explorer.root_nodes();
    if files.is_empty() {
        return writeln!(out, "No API endpoints found");
    }
    for file in &files {
        write_file_line(out, file)?;
        for endpoint in explorer.children(file) {
            write_endpoint_line(out, &endpoint)?;
        }
    }
    Ok(())
}

/// JSON form of the full outline: file views with their endpoint views.
pub fn tree_json(explorer: &ApiExplorer) -> serde_json::Value {
    let files: Vec<serde_json::Value> = explorer
        .root_nodes()
        .iter()
        .map(|file| {
            let children: Vec<NodeView> =
                explorer.children(file).iter().map(NodeView::from).collect();
            serde_json::json!({
                "file": NodeView::from(file),
                "endpoints": children,
            })
        })
        .collect();
    serde_json::json!({ "generation": explorer.generation(), "files": files })
}

pub fn render_files(explorer: &ApiExplorer, out: &mut impl Write) -> io::Result<()> {
    for file in explorer.root_nodes() {
        write_file_line(out, &file)?;
    }
    Ok(())
}

pub fn render_endpoints(nodes: &[TreeNode], out: &mut impl Write) -> io::Result<()> {
    for node in nodes {
        write_endpoint_line(out, node)?;
    }
    Ok(())
}

/// Navigation targets for every endpoint matching `method` and `path`.
pub fn locate(explorer: &ApiExplorer, method: &str, path: &str) -> Vec<NavigationTarget> {
    let method = HttpMethod::from(method);
    let mut targets: Vec<NavigationTarget> = Vec::new();
    for file in explorer.root_nodes() {
        for node in explorer.children(&file) {
            let Some(endpoint) = node.as_endpoint() else {
                continue;
            };
            if endpoint.record.method == method && endpoint.record.path == path {
                let target = endpoint.navigation();
                // Two rules can report the same declaration; one jump is enough.
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }
    }
    targets
}

pub fn render_stats(root: &Path, explorer: &ApiExplorer, out: &mut impl Write) -> io::Result<()> {
    let stats = qualify_with_stats(root, explorer.config()).stats;
    writeln!(out, "{}", stats)
}

fn write_file_line(out: &mut impl Write, node: &TreeNode) -> io::Result<()> {
    let relative = node
        .as_file()
        .map(|f| f.relative_path.display().to_string())
        .unwrap_or_else(|| node.label());
    writeln!(
        out,
        "{} ({})",
        relative,
        node.description().unwrap_or_default()
    )
}

fn write_endpoint_line(out: &mut impl Write, node: &TreeNode) -> io::Result<()> {
    let line = node.navigation().map(|t| t.line + 1).unwrap_or(0);
    match node.description() {
        Some(description) => writeln!(out, "  {}  [line {}]  {}", node.label(), line, description),
        None => writeln!(out, "  {}  [line {}]", node.label(), line),
    }
}
