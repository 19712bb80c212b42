//! The presentation model: a lazily expanded two-level outline.
//!
//! The root level (qualifying files) is computed once and cached until the
//! next invalidation. File children are recomputed from disk on every
//! expansion, so they always reflect current content.
//!
//! Invalidation is global: any refresh drops the cached root and notifies
//! every subscriber, who should discard whatever subtrees they hold and
//! re-read from the root.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;

use tracing::debug;

use super::builder::{endpoints_or_empty, qualify};
use super::types::{EndpointNode, TreeNode};
use crate::config::CompassConfig;

/// Why the outline was invalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationReason {
    /// An explicit refresh request.
    Manual,
    /// A coalesced batch of file-system events. The paths are informational;
    /// the invalidation still covers the whole outline.
    FileEvents(Vec<PathBuf>),
}

/// Signal sent to subscribers after every invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    /// Monotonic counter, bumped once per invalidation.
    pub generation: u64,
    pub reason: InvalidationReason,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    senders: Vec<(u64, Sender<Invalidation>)>,
}

/// Two-level endpoint outline over one workspace.
pub struct ApiExplorer {
    root: Option<PathBuf>,
    config: CompassConfig,
    cache: RwLock<Option<Arc<Vec<TreeNode>>>>,
    generation: AtomicU64,
    subscribers: Arc<Mutex<Subscribers>>,
}

impl ApiExplorer {
    /// Create an explorer. With no root the outline is always empty.
    pub fn new(root: Option<PathBuf>, config: CompassConfig) -> Self {
        Self {
            root,
            config,
            cache: RwLock::new(None),
            generation: AtomicU64::new(0),
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
        }
    }

    /// Open a workspace, reading its config file if present.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config = CompassConfig::load(&CompassConfig::path_for(&root));
        Self::new(Some(root), config)
    }

    pub fn workspace_root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn config(&self) -> &CompassConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Level 0: one file node per qualifying file, sorted by name.
    pub fn root_nodes(&self) -> Vec<TreeNode> {
        let Some(root) = self.root.as_deref() else {
            return Vec::new();
        };

        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Vec::clone(cached);
        }

        let started_at = self.generation();
        let nodes: Vec<TreeNode> = qualify(root, &self.config)
            .into_iter()
            .map(TreeNode::File)
            .collect();

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // An invalidation raced with the scan; leave the cache empty so the
        // next read rescans.
        if self.generation() == started_at {
            *cache = Some(Arc::new(nodes.clone()));
        }
        nodes
    }

    /// Children of `node`: endpoints for a file, nothing for an endpoint.
    pub fn children(&self, node: &TreeNode) -> Vec<TreeNode> {
        match node {
            TreeNode::File(file) => self.endpoints_for(&file.path),
            TreeNode::Endpoint(_) => Vec::new(),
        }
    }

    /// Children lookup in the host's style: `None` means the root.
    pub fn get_children(&self, parent: Option<&TreeNode>) -> Vec<TreeNode> {
        match parent {
            None => self.root_nodes(),
            Some(node) => self.children(node),
        }
    }

    /// Endpoint nodes for one file, read from disk now.
    pub fn endpoints_for(&self, path: &Path) -> Vec<TreeNode> {
        if self.root.is_none() {
            return Vec::new();
        }
        endpoints_or_empty(path, self.config.max_file_bytes)
            .into_iter()
            .map(|record| TreeNode::Endpoint(EndpointNode::new(path.to_path_buf(), record)))
            .collect()
    }

    /// Drop the cached outline and notify every subscriber.
    pub fn invalidate(&self, reason: InvalidationReason) -> u64 {
        let generation = {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            *cache = None;
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        debug!(generation, reason = ?reason, "outline invalidated");

        let signal = Invalidation { generation, reason };
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers
            .senders
            .retain(|(_, sender)| sender.send(signal.clone()).is_ok());
        generation
    }

    /// Manual refresh.
    pub fn refresh(&self) -> u64 {
        self.invalidate(InvalidationReason::Manual)
    }

    /// Listen for invalidations. Dropping the subscription unsubscribes.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.senders.push((id, sender));
        Subscription {
            id,
            receiver,
            hub: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .senders
            .len()
    }
}

/// Receiving end of [`ApiExplorer::subscribe`].
pub struct Subscription {
    id: u64,
    receiver: Receiver<Invalidation>,
    hub: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    /// Block until the next invalidation. `None` once the explorer is gone.
    pub fn recv(&self) -> Option<Invalidation> {
        self.receiver.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Invalidation> {
        match self.receiver.recv_timeout(timeout) {
            Ok(signal) => Some(signal),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_recv(&self) -> Option<Invalidation> {
        match self.receiver.try_recv() {
            Ok(signal) => Some(signal),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain everything queued and return the newest signal, if any.
    pub fn latest(&self) -> Option<Invalidation> {
        let mut latest = None;
        while let Some(signal) = self.try_recv() {
            latest = Some(signal);
        }
        latest
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            let mut subscribers = hub.lock().unwrap_or_else(PoisonError::into_inner);
            subscribers.senders.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::HttpMethod;
    use std::fs;

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("users.js"),
            "app.delete('/users/:id', h);\napp.get('/users', h /* list users */);\n",
        )
        .unwrap();
        fs::write(dir.path().join("helpers.js"), "module.exports = {};\n").unwrap();
        dir
    }

    #[test]
    fn test_no_root_is_empty() {
        let explorer = ApiExplorer::new(None, CompassConfig::default());
        assert!(explorer.root_nodes().is_empty());
        assert!(explorer.get_children(None).is_empty());
        assert!(explorer.endpoints_for(Path::new("/anything.js")).is_empty());
    }

    #[test]
    fn test_root_and_children() {
        let dir = workspace();
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());

        let roots = explorer.root_nodes();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].label(), "users.js");
        assert_eq!(roots[0].description().as_deref(), Some("2 endpoints"));

        let children = explorer.children(&roots[0]);
        let labels: Vec<String> = children.iter().map(TreeNode::label).collect();
        assert_eq!(labels, vec!["GET /users", "DELETE /users/:id"]);
        assert_eq!(children[0].description().as_deref(), Some("list users"));
        assert_eq!(children[0].navigation().unwrap().line, 1);
        assert_eq!(
            children[0].as_endpoint().unwrap().record.method,
            HttpMethod::Get
        );

        assert!(explorer.children(&children[0]).is_empty());
    }

    #[test]
    fn test_root_is_cached_until_invalidated() {
        let dir = workspace();
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());
        assert_eq!(explorer.root_nodes().len(), 1);

        fs::write(dir.path().join("orders.js"), "app.post('/orders', h);").unwrap();
        assert_eq!(explorer.root_nodes().len(), 1, "cached root survives until refresh");

        explorer.refresh();
        let labels: Vec<String> = explorer.root_nodes().iter().map(TreeNode::label).collect();
        assert_eq!(labels, vec!["orders.js", "users.js"]);
    }

    #[test]
    fn test_children_read_current_content() {
        let dir = workspace();
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());
        let roots = explorer.root_nodes();

        fs::write(dir.path().join("users.js"), "app.put('/users/:id', h);").unwrap();
        let labels: Vec<String> = explorer
            .children(&roots[0])
            .iter()
            .map(TreeNode::label)
            .collect();
        assert_eq!(labels, vec!["PUT /users/:id"]);
    }

    #[test]
    fn test_children_of_deleted_file_is_empty() {
        let dir = workspace();
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());
        let roots = explorer.root_nodes();
        fs::remove_file(dir.path().join("users.js")).unwrap();
        assert!(explorer.children(&roots[0]).is_empty());
    }

    #[test]
    fn test_children_respect_size_limit() {
        let dir = workspace();
        let explorer = ApiExplorer::new(Some(dir.path().to_path_buf()), CompassConfig::default());
        let roots = explorer.root_nodes();

        let capped = ApiExplorer::new(
            Some(dir.path().to_path_buf()),
            CompassConfig {
                max_file_bytes: 16,
                ..CompassConfig::default()
            },
        );
        assert!(capped.root_nodes().is_empty());
        assert!(capped.children(&roots[0]).is_empty());
        assert!(capped
            .endpoints_for(&dir.path().join("users.js"))
            .is_empty());
    }

    #[test]
    fn test_subscribers_receive_invalidations() {
        let explorer = ApiExplorer::new(None, CompassConfig::default());
        let first = explorer.subscribe();
        let second = explorer.subscribe();
        assert_eq!(explorer.subscriber_count(), 2);

        let generation = explorer.refresh();
        assert_eq!(generation, 1);
        assert_eq!(
            first.try_recv(),
            Some(Invalidation {
                generation: 1,
                reason: InvalidationReason::Manual
            })
        );
        assert_eq!(second.try_recv().map(|s| s.generation), Some(1));
        assert_eq!(first.try_recv(), None);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let explorer = ApiExplorer::new(None, CompassConfig::default());
        let subscription = explorer.subscribe();
        assert_eq!(explorer.subscriber_count(), 1);
        drop(subscription);
        assert_eq!(explorer.subscriber_count(), 0);
        explorer.refresh();
        assert_eq!(explorer.generation(), 1);
    }

    #[test]
    fn test_subscription_outlives_explorer() {
        let explorer = ApiExplorer::new(None, CompassConfig::default());
        let subscription = explorer.subscribe();
        explorer.refresh();
        drop(explorer);
        assert!(subscription.recv().is_some());
        assert!(subscription.recv().is_none());
    }

    #[test]
    fn test_latest_drains_queue() {
        let explorer = ApiExplorer::new(None, CompassConfig::default());
        let subscription = explorer.subscribe();
        explorer.refresh();
        explorer.invalidate(InvalidationReason::FileEvents(vec![PathBuf::from("a.js")]));
        let latest = subscription.latest().unwrap();
        assert_eq!(latest.generation, 2);
        assert!(matches!(latest.reason, InvalidationReason::FileEvents(_)));
        assert!(subscription.try_recv().is_none());
    }
}
