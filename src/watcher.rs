//! File watcher: turns workspace file events into outline invalidations.
//!
//! Events are coalesced by `notify-debouncer-mini` over a short trailing
//! window, so a burst of saves costs one rescan instead of one per event.
//! Outside excluded directories, an event counts when it names a file
//! with a recognized extension, a directory, or a path that no longer
//! exists (a renamed or deleted directory reports only its own path).
//! Every batch invalidates the whole outline.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use tracing::{debug, info, warn};

use crate::config::CompassConfig;
use crate::error::{CompassError, Result};
use crate::tree::{ApiExplorer, InvalidationReason};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Keeps the watcher alive. Dropping it stops watching.
pub struct WatchHandle {
    _debouncer: Debouncer<RecommendedWatcher>,
    root: PathBuf,
}

impl WatchHandle {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        info!(root = %self.root.display(), "file watcher stopped");
    }
}

/// Watch the explorer's workspace using its configured debounce window.
pub fn start_watching(explorer: &Arc<ApiExplorer>) -> Result<WatchHandle> {
    let debounce = explorer.config().debounce();
    start_watching_with(explorer, debounce)
}

/// Watch with an explicit debounce window (zero means the default).
pub fn start_watching_with(explorer: &Arc<ApiExplorer>, debounce: Duration) -> Result<WatchHandle> {
    let root = explorer
        .workspace_root()
        .ok_or(CompassError::NoWorkspace)?
        .to_path_buf();
    let debounce = if debounce.is_zero() {
        DEFAULT_DEBOUNCE
    } else {
        debounce
    };

    let target: Weak<ApiExplorer> = Arc::downgrade(explorer);
    let config = explorer.config().clone();
    let event_root = root.clone();

    let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "file watch error");
                return;
            }
        };
        let paths = relevant_paths(
            &event_root,
            &config,
            events.iter().map(|event| event.path.as_path()),
        );
        if paths.is_empty() {
            return;
        }
        let Some(explorer) = target.upgrade() else {
            return;
        };
        debug!(changed = paths.len(), "workspace files changed");
        explorer.invalidate(InvalidationReason::FileEvents(paths));
    })?;

    debouncer.watcher().watch(&root, RecursiveMode::Recursive)?;
    info!(root = %root.display(), debounce_ms = debounce.as_millis() as u64, "file watcher started");

    Ok(WatchHandle {
        _debouncer: debouncer,
        root,
    })
}

/// Whether an event on `path` should trigger a refresh.
pub fn is_watched_path(root: &Path, config: &CompassConfig, path: &Path) -> bool {
    if config.is_excluded(path, root) {
        return false;
    }
    config.is_recognized(path)
        || path.extension().is_none()
        || path.is_dir()
        || !path.exists()
}

/// Filter and de-duplicate a batch of event paths, keeping first-seen order.
pub fn relevant_paths<'a>(
    root: &Path,
    config: &CompassConfig,
    paths: impl IntoIterator<Item = &'a Path>,
) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    for path in paths {
        if is_watched_path(root, config, path) && !out.iter().any(|p| p == path) {
            out.push(path.to_path_buf());
        }
    }
    out
}
