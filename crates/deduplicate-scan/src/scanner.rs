//! JWalk-based directory walker.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indexmap::IndexSet;
use jwalk::{Parallelism, WalkDir};
use serde::Serialize;

use deduplicate_core::{ScanConfig, ScanError, ScanWarning, WarningKind};

/// Regular files found under a root, in a stable order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Canonicalized root that was walked.
    pub root: PathBuf,
    /// Absolute paths of every regular file reached. When links are followed
    /// each file appears once, under its resolved path.
    pub files: Vec<PathBuf>,
    /// Number of directories visited, root included.
    pub dirs_scanned: u64,
    /// Entries that could not be read and were left out.
    pub warnings: Vec<ScanWarning>,
    /// Wall time spent walking.
    pub scan_duration: Duration,
}

impl ScanResult {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Directory walker built on jwalk.
///
/// Children are sorted by name so two walks of an unchanged tree yield the
/// same sequence, which keeps duplicate group ordering reproducible.
#[derive(Debug, Default)]
pub struct JwalkScanner;

impl JwalkScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Walk the configured root and collect its regular files.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanResult, ScanError> {
        let start = Instant::now();
        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let ignore = config.ignore_matcher()?;
        let mut files = IndexSet::new();
        let mut warnings = Vec::new();
        let mut dirs_scanned: u64 = 0;

        let walker = WalkDir::new(&root_path)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .min_depth(0)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX))
            .process_read_dir(move |_depth, _path, _state, children| {
                if ignore.is_empty() {
                    return;
                }
                children.retain(|child| match child {
                    Ok(entry) => !ignore.is_match(Path::new(&entry.file_name)),
                    Err(_) => true,
                });
            });

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warnings.push(ScanWarning::new(
                        path,
                        err.to_string(),
                        WarningKind::ReadError,
                    ));
                    continue;
                }
            };

            let path = entry.path();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                dirs_scanned += 1;
                continue;
            }

            let is_file = if file_type.is_file() {
                true
            } else if file_type.is_symlink() && config.follow_symlinks {
                match std::fs::metadata(&path) {
                    Ok(metadata) => metadata.is_file(),
                    Err(err) => {
                        warnings.push(ScanWarning::from_io(
                            &path,
                            &err,
                            WarningKind::MetadataError,
                        ));
                        false
                    }
                }
            } else {
                false
            };

            if !is_file {
                continue;
            }

            // Resolved so a followed link and its target are one candidate.
            if config.follow_symlinks {
                match path.canonicalize() {
                    Ok(resolved) => {
                        files.insert(resolved);
                    }
                    Err(err) => warnings.push(ScanWarning::from_io(
                        &path,
                        &err,
                        WarningKind::MetadataError,
                    )),
                }
            } else {
                files.insert(path);
            }
        }

        let scan_duration = start.elapsed();
        tracing::debug!(
            root = %root_path.display(),
            files = files.len(),
            dirs = dirs_scanned,
            warnings = warnings.len(),
            "scan complete"
        );

        Ok(ScanResult {
            root: root_path,
            files: files.into_iter().collect(),
            dirs_scanned,
            warnings,
            scan_duration,
        })
    }
}
