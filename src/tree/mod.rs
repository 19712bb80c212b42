//! Endpoint outline: the two-level presentation model.
//!
//! Provides node types, workspace qualification, and the lazily expanded
//! explorer with its invalidation channel.

pub mod builder;
pub mod model;
pub mod types;

pub use builder::{
    endpoints_or_empty, qualify, qualify_with_stats, read_endpoints, scan_candidates,
    Qualification, QualifyStats,
};
pub use model::{ApiExplorer, Invalidation, InvalidationReason, Subscription};
pub use types::{
    EndpointNode, FileNode, NavigationTarget, NodeIcon, NodeKind, NodeView, TreeNode,
};
