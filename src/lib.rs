//! # API Compass
//!
//! Finds HTTP endpoint declarations scattered across a codebase and
//! presents them as a two-level outline: files that declare endpoints,
//! then the endpoints inside each file.
//!
//! ## Key Features
//!
//! - **Lexical**: four pattern families cover Express/Koa-style calls,
//!   `router.` calls, and NestJS/FastAPI-style decorators. No build step.
//! - **Deterministic**: endpoints sort GET, POST, PUT, PATCH, DELETE, then
//!   by path; files sort by name.
//! - **Lazy**: file children are read from disk when expanded.
//! - **Live**: a debounced file watcher invalidates the outline on change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use api_compass::ApiExplorer;
//!
//! let explorer = ApiExplorer::open(".");
//! for file in explorer.root_nodes() {
//!     println!("{}", file.label());
//!     for endpoint in explorer.children(&file) {
//!         println!("  {}", endpoint.label());
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod parser;
pub mod tree;
pub mod watcher;

// Re-exports for convenience
pub use config::CompassConfig;
pub use error::{CompassError, Result};

pub use parser::{extract, EndpointRecord, HttpMethod, PatternFamily};
pub use tree::{
    qualify, ApiExplorer, FileNode, Invalidation, InvalidationReason, NavigationTarget, NodeIcon,
    NodeKind, Subscription, TreeNode,
};
pub use watcher::{start_watching, WatchHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn labels(nodes: &[TreeNode]) -> Vec<String> {
        nodes.iter().map(TreeNode::label).collect()
    }

    #[test]
    fn test_round_trip_records() {
        let records = extract("app.get('/users')");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method, HttpMethod::Get);
        assert_eq!(records[0].path, "/users");
        assert_eq!(records[0].description, None);

        let records = extract("app.get('/users', handler /* list users */)");
        assert_eq!(records[0].description.as_deref(), Some("list users"));
    }

    #[test]
    fn test_express_and_router_lines_are_both_listed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "routes.js", "app.get('/a', h);\nrouter.get('/a', h);\n");
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());

        let files = explorer.root_nodes();
        let endpoints = explorer.children(&files[0]);
        assert!(endpoints.len() >= 2);
        assert!(endpoints.iter().all(|n| n.label() == "GET /a"));

        let mut lines: Vec<usize> = endpoints
            .iter()
            .filter_map(|n| n.navigation())
            .map(|t| t.line)
            .collect();
        lines.dedup();
        assert_eq!(lines, vec![0, 1]);
    }

    #[test]
    fn test_decorator_sorted_between_get_and_put() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "items.controller.ts",
            "@Controller()\nexport class Items {\n  @Delete('/items/:id') remove() {}\n  @Put('/items/:id') replace() {}\n  @Post('/items') create() {}\n  @Patch('/items/:id') edit() {}\n  @Get('/items') list() {}\n}\n",
        );
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());
        let files = explorer.root_nodes();
        assert_eq!(
            labels(&explorer.children(&files[0])),
            vec![
                "GET /items",
                "POST /items",
                "PUT /items/:id",
                "PATCH /items/:id",
                "DELETE /items/:id"
            ]
        );
    }

    #[test]
    fn test_files_without_endpoints_never_appear() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.js", "app.get('/a')");
        write(dir.path(), "b.js", "console.log('nothing here')");
        write(dir.path(), "node_modules/x/index.js", "app.get('/vendored')");
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());
        assert_eq!(labels(&explorer.root_nodes()), vec!["a.js"]);
    }

    #[test]
    fn test_root_order_ignores_directory_layout() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/zebra.js", "app.get('/z')");
        write(dir.path(), "b/Mango.py", "@get('/m')");
        write(dir.path(), "c/apple.ts", "@Get('/a')");
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());
        assert_eq!(
            labels(&explorer.root_nodes()),
            vec!["apple.ts", "Mango.py", "zebra.js"]
        );
    }

    #[test]
    fn test_invalidation_drops_stale_entries() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "old.js", "app.get('/old')");
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());
        let subscription = explorer.subscribe();
        assert_eq!(labels(&explorer.root_nodes()), vec!["old.js"]);

        fs::remove_file(dir.path().join("old.js")).unwrap();
        write(dir.path(), "new.js", "app.patch('/new')");
        explorer.invalidate(InvalidationReason::FileEvents(vec![
            dir.path().join("old.js"),
            dir.path().join("new.js"),
        ]));

        assert!(subscription.try_recv().is_some());
        let files = explorer.root_nodes();
        assert_eq!(labels(&files), vec!["new.js"]);
        assert_eq!(labels(&explorer.children(&files[0])), vec!["PATCH /new"]);
    }

    #[test]
    fn test_unreadable_file_is_silently_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.ts", "@Get('/ok')");
        fs::write(dir.path().join("bad.ts"), [0xc3, 0x28, b'@', 0xa0]).unwrap();
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());
        assert_eq!(labels(&explorer.root_nodes()), vec!["good.ts"]);
    }

    #[test]
    fn test_extract_is_deterministic() {
        let source = "router.delete('/b');\n@Get('/a')\napp.post('/c' /* c */);\n@get('/a')";
        let first = extract(source);
        for _ in 0..5 {
            assert_eq!(extract(source), first);
        }
    }
}
