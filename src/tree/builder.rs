//! File qualification: scans a workspace and keeps the files that declare
//! at least one endpoint.
//!
//! Walks candidate files (extension filter, excluded dependency dirs,
//! optional hidden entries and .gitignore), reads them on a bounded rayon pool, runs the
//! extractor on each, and sorts the survivors by display name. An
//! unreadable file counts as zero endpoints.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::types::FileNode;
use crate::config::CompassConfig;
use crate::error::{CompassError, Result};
use crate::parser::{extract, locale_cmp, EndpointRecord};

/// Enumerate candidate source files under `root`.
pub fn scan_candidates(root: &Path, config: &CompassConfig) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(!config.include_hidden)
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore);

    let exclude = config.clone();
    let walk_root = root.to_path_buf();
    builder.filter_entry(move |entry| {
        !(entry.file_type().is_some_and(|ft| ft.is_dir())
            && exclude.is_excluded(entry.path(), &walk_root))
    });

    let mut files = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "failed to read directory entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        if !config.is_recognized(path) {
            continue;
        }
        if let Ok(meta) = entry.metadata() {
            if meta.len() > config.max_file_bytes {
                info!(
                    path = %path.display(),
                    bytes = meta.len(),
                    limit = config.max_file_bytes,
                    "skipping file over the size limit"
                );
                continue;
            }
        }
        files.push(entry.into_path());
    }
    files
}

/// Read one file of at most `max_bytes` and extract its endpoints.
pub fn read_endpoints(path: &Path, max_bytes: u64) -> Result<Vec<EndpointRecord>> {
    let meta = fs::metadata(path).map_err(|e| CompassError::io(path, e))?;
    if meta.is_dir() {
        return Err(CompassError::NotAFile(path.to_path_buf()));
    }
    if meta.len() > max_bytes {
        return Err(CompassError::TooLarge {
            path: path.to_path_buf(),
            bytes: meta.len(),
            limit: max_bytes,
        });
    }
    let source = fs::read_to_string(path).map_err(|e| CompassError::io(path, e))?;
    Ok(extract(&source))
}

/// Like [`read_endpoints`], but a failure is logged and yields no endpoints.
pub fn endpoints_or_empty(path: &Path, max_bytes: u64) -> Vec<EndpointRecord> {
    match read_endpoints(path, max_bytes) {
        Ok(records) => records,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable file treated as empty");
            Vec::new()
        }
    }
}

/// Counters from one qualification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualifyStats {
    pub candidates: usize,
    pub qualifying: usize,
    pub unreadable: usize,
    pub endpoints: usize,
}

impl std::fmt::Display for QualifyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scanned {} files: {} with endpoints ({} endpoints), {} unreadable",
            self.candidates, self.qualifying, self.endpoints, self.unreadable
        )
    }
}

/// Result of [`qualify_with_stats`].
#[derive(Debug, Clone, Default)]
pub struct Qualification {
    pub files: Vec<FileNode>,
    pub stats: QualifyStats,
}

/// Qualifying files under `root`, sorted by display name.
pub fn qualify(root: &Path, config: &CompassConfig) -> Vec<FileNode> {
    qualify_with_stats(root, config).files
}

pub fn qualify_with_stats(root: &Path, config: &CompassConfig) -> Qualification {
    let candidates = scan_candidates(root, config);

    let read_all = || -> Vec<(PathBuf, Option<usize>)> {
        candidates
            .par_iter()
            .map(|path| {
                let count = match read_endpoints(path, config.max_file_bytes) {
                    Ok(records) => Some(records.len()),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "unreadable file treated as empty");
                        None
                    }
                };
                (path.clone(), count)
            })
            .collect()
    };

    let results = match read_pool(config) {
        Ok(pool) => pool.install(read_all),
        Err(e) => {
            warn!(error = %e, "falling back to the global read pool");
            read_all()
        }
    };

    let mut stats = QualifyStats {
        candidates: candidates.len(),
        ..QualifyStats::default()
    };
    let mut files = Vec::new();
    for (path, count) in results {
        match count {
            None => stats.unreadable += 1,
            Some(0) => {}
            Some(n) => {
                stats.endpoints += n;
                files.push(FileNode::new(path, root, n));
            }
        }
    }
    stats.qualifying = files.len();

    // Sort after collecting so completion order never leaks into the result.
    files.sort_by(|a, b| {
        locale_cmp(&a.display_name, &b.display_name).then_with(|| a.path.cmp(&b.path))
    });

    info!(
        root = %root.display(),
        candidates = stats.candidates,
        qualifying = stats.qualifying,
        "workspace qualified"
    );
    Qualification { files, stats }
}

fn read_pool(config: &CompassConfig) -> Result<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_parallel_reads)
        .thread_name(|i| format!("api-compass-read-{i}"))
        .build()?;
    Ok(pool)
}
