//! Error types for API Compass.
//!
//! Extraction itself never fails. These errors only surface from the
//! outer layers: reading a single file on request, loading config,
//! starting the watcher, and building the read pool.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CompassError>;

#[derive(Debug, Error)]
pub enum CompassError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to build read pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("not a file node: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("{} is {bytes} bytes, over the {limit} byte limit", path.display())]
    TooLarge { path: PathBuf, bytes: u64, limit: u64 },

    #[error("{} is outside the workspace", .0.display())]
    OutsideWorkspace(PathBuf),

    #[error("no workspace root is open")]
    NoWorkspace,
}

impl CompassError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompassError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = CompassError::io(
            "src/routes.ts",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("src/routes.ts"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_no_workspace_message() {
        assert_eq!(
            CompassError::NoWorkspace.to_string(),
            "no workspace root is open"
        );
    }

    #[test]
    fn test_too_large_message() {
        let err = CompassError::TooLarge {
            path: "bundle.js".into(),
            bytes: 4096,
            limit: 1024,
        };
        assert_eq!(
            err.to_string(),
            "bundle.js is 4096 bytes, over the 1024 byte limit"
        );
    }
}
