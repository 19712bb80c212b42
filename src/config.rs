//! Workspace configuration, read from `.api-compass/config.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CompassError, Result};

/// Directory (relative to the workspace root) holding the config file.
pub const CONFIG_DIR: &str = ".api-compass";
/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompassConfig {
    /// File extensions (without the dot) that may contain endpoint declarations.
    pub extensions: Vec<String>,
    /// Directory names skipped during enumeration and ignored by the watcher.
    pub exclude_dirs: Vec<String>,
    /// Honour `.gitignore` / `.git/info/exclude` while walking.
    pub respect_gitignore: bool,
    /// Scan and watch dot-files and dot-directories.
    pub include_hidden: bool,
    /// Trailing window used to coalesce bursts of file events.
    pub debounce_ms: u64,
    /// Upper bound on concurrent file reads. 0 = one per CPU.
    pub max_parallel_reads: usize,
    /// Candidates larger than this are skipped.
    pub max_file_bytes: u64,
}

impl Default for CompassConfig {
    fn default() -> Self {
        Self {
            extensions: ["ts", "js", "mjs", "cjs", "jsx", "tsx", "py"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: [
                ".git",
                "node_modules",
                "bower_components",
                "jspm_packages",
                "__pycache__",
                ".venv",
                "venv",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            respect_gitignore: true,
            include_hidden: true,
            debounce_ms: 300,
            max_parallel_reads: 0,
            max_file_bytes: 2 * 1024 * 1024,
        }
    }
}

impl CompassConfig {
    /// Path of the config file for a workspace root.
    pub fn path_for(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load config, falling back to defaults when the file is missing or broken.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Load config, reporting parse failures. A missing file is not an error.
    pub fn try_load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(CompassError::io(path, e)),
        };
        toml::from_str(&text).map_err(|source| CompassError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether `path` carries one of the recognized extensions.
    pub fn is_recognized(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Whether any component of `path` below `root` is an excluded directory,
    /// or a hidden entry when hidden entries are off.
    pub fn is_excluded(&self, path: &Path, root: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        relative.components().any(|component| {
            let Component::Normal(name) = component else {
                return false;
            };
            name.to_str()
                .map(|name| {
                    (!self.include_hidden && name.starts_with('.'))
                        || self.exclude_dirs.iter().any(|dir| dir == name)
                })
                .unwrap_or(false)
        })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
