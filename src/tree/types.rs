//! Presentation nodes for the two-level endpoint outline.
//!
//! Level 0 holds one [`FileNode`] per qualifying source file; level 1 holds
//! one [`EndpointNode`] per declaration in that file. Nodes are immutable
//! snapshots.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::parser::{EndpointRecord, HttpMethod};

/// Which level a node lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Endpoint,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => write!(f, "file"),
            NodeKind::Endpoint => write!(f, "endpoint"),
        }
    }
}

/// Visual category of a node. The host maps these to its own icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeIcon {
    /// Source file.
    Code,
    /// GET.
    Search,
    /// POST.
    DiffAdded,
    /// PUT.
    Edit,
    /// PATCH.
    DiffModified,
    /// DELETE.
    Trash,
    /// Any other method.
    SymbolEvent,
}

impl NodeIcon {
    pub fn for_method(method: &HttpMethod) -> Self {
        match method {
            HttpMethod::Get => NodeIcon::Search,
            HttpMethod::Post => NodeIcon::DiffAdded,
            HttpMethod::Put => NodeIcon::Edit,
            HttpMethod::Patch => NodeIcon::DiffModified,
            HttpMethod::Delete => NodeIcon::Trash,
            HttpMethod::Other(_) => NodeIcon::SymbolEvent,
        }
    }

    /// Icon identifier as understood by the host's icon theme.
    pub fn id(&self) -> &'static str {
        match self {
            NodeIcon::Code => "code",
            NodeIcon::Search => "search",
            NodeIcon::DiffAdded => "diff-added",
            NodeIcon::Edit => "edit",
            NodeIcon::DiffModified => "diff-modified",
            NodeIcon::Trash => "trash",
            NodeIcon::SymbolEvent => "symbol-event",
        }
    }
}

/// Where the host should jump when an endpoint is activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTarget {
    pub path: PathBuf,
    /// Zero-based line; the cursor goes to column 0.
    pub line: usize,
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line + 1)
    }
}

/// A source file with at least one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Absolute path; the stable key used to expand this node.
    pub path: PathBuf,
    /// Path relative to the workspace root, for tooltips.
    pub relative_path: PathBuf,
    /// Base file name.
    pub display_name: String,
    /// Endpoint count at discovery time. Display only.
    pub endpoint_count: usize,
}

impl FileNode {
    pub fn new(path: PathBuf, root: &Path, endpoint_count: usize) -> Self {
        let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            path,
            relative_path,
            display_name,
            endpoint_count,
        }
    }

    /// `"1 endpoint"` / `"3 endpoints"`.
    pub fn summary(&self) -> String {
        format!(
            "{} endpoint{}",
            self.endpoint_count,
            plural(self.endpoint_count)
        )
    }

    pub fn tooltip(&self) -> String {
        format!(
            "{}\n{} API endpoint{}",
            self.relative_path.display(),
            self.endpoint_count,
            plural(self.endpoint_count)
        )
    }
}

/// One endpoint declaration inside a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointNode {
    /// Owning file (absolute).
    pub file: PathBuf,
    pub record: EndpointRecord,
}

impl EndpointNode {
    pub fn new(file: PathBuf, record: EndpointRecord) -> Self {
        Self { file, record }
    }

    pub fn tooltip(&self) -> String {
        format!(
            "{}\n{}\nLine: {}",
            self.record.label(),
            self.record.description.as_deref().unwrap_or("No description"),
            self.record.line_number + 1
        )
    }

    pub fn navigation(&self) -> NavigationTarget {
        NavigationTarget {
            path: self.file.clone(),
            line: self.record.line_number,
        }
    }
}

/// A node of the outline, tagged by level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    File(FileNode),
    Endpoint(EndpointNode),
}

impl TreeNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::File(_) => NodeKind::File,
            TreeNode::Endpoint(_) => NodeKind::Endpoint,
        }
    }

    pub fn label(&self) -> String {
        match self {
            TreeNode::File(file) => file.display_name.clone(),
            TreeNode::Endpoint(endpoint) => endpoint.record.label(),
        }
    }

    /// Short text shown next to the label.
    pub fn description(&self) -> Option<String> {
        match self {
            TreeNode::File(file) => Some(file.summary()),
            TreeNode::Endpoint(endpoint) => endpoint.record.description.clone(),
        }
    }

    pub fn tooltip(&self) -> String {
        match self {
            TreeNode::File(file) => file.tooltip(),
            TreeNode::Endpoint(endpoint) => endpoint.tooltip(),
        }
    }

    pub fn icon(&self) -> NodeIcon {
        match self {
            TreeNode::File(_) => NodeIcon::Code,
            TreeNode::Endpoint(endpoint) => NodeIcon::for_method(&endpoint.record.method),
        }
    }

    /// Context key the host uses to pick node actions.
    pub fn context_value(&self) -> &'static str {
        match self {
            TreeNode::File(_) => "apiFile",
            TreeNode::Endpoint(_) => "apiEndpoint",
        }
    }

    /// File nodes always have children; endpoints never do.
    pub fn is_expandable(&self) -> bool {
        matches!(self, TreeNode::File(_))
    }

    pub fn navigation(&self) -> Option<NavigationTarget> {
        match self {
            TreeNode::File(_) => None,
            TreeNode::Endpoint(endpoint) => Some(endpoint.navigation()),
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            TreeNode::File(file) => Some(file),
            TreeNode::Endpoint(_) => None,
        }
    }

    pub fn as_endpoint(&self) -> Option<&EndpointNode> {
        match self {
            TreeNode::File(_) => None,
            TreeNode::Endpoint(endpoint) => Some(endpoint),
        }
    }
}

/// Flattened, host-facing rendering of a node (JSON output, MCP results).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub kind: NodeKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tooltip: String,
    pub icon: &'static str,
    pub context_value: &'static str,
    pub expandable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<NavigationTarget>,
}

impl From<&TreeNode> for NodeView {
    fn from(node: &TreeNode) -> Self {
        Self {
            kind: node.kind(),
            label: node.label(),
            description: node.description(),
            tooltip: node.tooltip(),
            icon: node.icon().id(),
            context_value: node.context_value(),
            expandable: node.is_expandable(),
            target: node.navigation(),
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
