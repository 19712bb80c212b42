//! API Compass CLI - browse HTTP endpoints declared in a codebase.
//!
//! Usage:
//!   api-compass                          # Full outline (files + endpoints)
//!   api-compass files                    # Files with endpoints
//!   api-compass endpoints src/app.ts     # Endpoints in one file
//!   api-compass locate GET /users        # Jump targets (file:line)
//!   api-compass stats                    # Scan statistics
//!   api-compass watch                    # Live outline

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use api_compass::cli::{self, Cli, Commands};
use api_compass::tree::{read_endpoints, EndpointNode, NodeView, TreeNode};
use api_compass::{watcher, ApiExplorer};
use clap::Parser;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Cli::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    let root = args.root.canonicalize().unwrap_or(args.root);
    let explorer = Arc::new(ApiExplorer::open(root.clone()));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command.unwrap_or(Commands::Tree) {
        Commands::Tree => {
            if args.json {
                print_json(&mut out, &cli::tree_json(&explorer))?;
            } else {
                cli::render_tree(&explorer, &mut out)?;
            }
        }

        Commands::Files => {
            if args.json {
                let views: Vec<NodeView> = explorer.root_nodes().iter().map(NodeView::from).collect();
                print_json(&mut out, &views)?;
            } else {
                cli::render_files(&explorer, &mut out)?;
            }
        }

        Commands::Endpoints { file } => {
            let path = if file.is_absolute() { file } else { root.join(file) };
            // Unlike tree expansion, an explicit request reports read failures.
            let records = read_endpoints(&path, explorer.config().max_file_bytes)
                .with_context(|| format!("cannot list endpoints of {}", path.display()))?;
            let nodes: Vec<TreeNode> = records
                .into_iter()
                .map(|record| TreeNode::Endpoint(EndpointNode::new(path.clone(), record)))
                .collect();
            if args.json {
                let views: Vec<NodeView> = nodes.iter().map(NodeView::from).collect();
                print_json(&mut out, &views)?;
            } else {
                cli::render_endpoints(&nodes, &mut out)?;
            }
        }

        Commands::Locate { method, path } => {
            let targets = cli::locate(&explorer, &method, &path);
            if args.json {
                print_json(&mut out, &targets)?;
            } else if targets.is_empty() {
                writeln!(out, "No declaration of {} {}", method.to_uppercase(), path)?;
            } else {
                for target in targets {
                    writeln!(out, "{}", target)?;
                }
            }
        }

        Commands::Stats => {
            cli::render_stats(&root, &explorer, &mut out)?;
        }

        Commands::Watch => {
            let subscription = explorer.subscribe();
            let _handle = watcher::start_watching(&explorer)?;
            cli::render_tree(&explorer, &mut out)?;
            out.flush()?;

            while let Some(signal) = subscription.recv() {
                // Anything queued behind this signal is covered by one redraw.
                let generation = subscription
                    .latest()
                    .map(|s| s.generation)
                    .unwrap_or(signal.generation);
                writeln!(out, "\n── refreshed (generation {}) ──", generation)?;
                cli::render_tree(&explorer, &mut out)?;
                out.flush()?;
            }
        }
    }

    Ok(())
}

fn print_json(out: &mut impl Write, value: &impl serde::Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
