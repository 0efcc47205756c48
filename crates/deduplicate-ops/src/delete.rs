//! Deletion of the members a keep filter did not retain.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use deduplicate_analyze::DuplicateGroup;

use crate::keep::{KeepError, KeepSelector};
use crate::report::{DeletionFailure, DeletionReport};

/// Errors that reject a group before anything is deleted.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The keep filter returned paths that are not members of the group.
    #[error("Keep filter returned {} path(s) outside the group: {}", .unexpected.len(), display_paths(.unexpected))]
    ContractViolation { unexpected: Vec<PathBuf> },

    /// The keep filter itself failed.
    #[error(transparent)]
    Keep(#[from] KeepError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Delete every member of `members` that `filter` does not keep.
///
/// The filter's choice is checked before the first deletion: a path outside
/// `members` fails the whole group with [`DeleteError::ContractViolation`]
/// and `delete` is never called. Otherwise `delete` runs exactly once per
/// unkept member, in input order. A failing delete is recorded in the report
/// and the remaining members are still processed.
pub fn delete_duplicates<S, F>(
    filter: &S,
    members: &[PathBuf],
    mut delete: F,
) -> Result<DeletionReport, DeleteError>
where
    S: KeepSelector + ?Sized,
    F: FnMut(&Path) -> io::Result<()>,
{
    let kept = filter.select(members)?;

    let member_set: HashSet<&Path> = members.iter().map(PathBuf::as_path).collect();
    let unexpected: Vec<PathBuf> = kept
        .iter()
        .filter(|path| !member_set.contains(path.as_path()))
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        return Err(DeleteError::ContractViolation { unexpected });
    }

    let keep_set: HashSet<&Path> = kept.iter().map(PathBuf::as_path).collect();
    let mut deleted = Vec::new();
    let mut failures = Vec::new();

    for member in members {
        if keep_set.contains(member.as_path()) {
            continue;
        }
        match delete(member) {
            Ok(()) => deleted.push(member.clone()),
            Err(err) => {
                tracing::warn!(path = %member.display(), error = %err, "failed to delete");
                failures.push(DeletionFailure::new(member.clone(), err.to_string()));
            }
        }
    }

    Ok(DeletionReport {
        kept,
        deleted,
        failures,
        bytes_reclaimed: 0,
    })
}

/// The default delete operation.
pub fn remove_file(path: &Path) -> io::Result<()> {
    std::fs::remove_file(path)
}

/// Runs [`delete_duplicates`] with the real filesystem, or in dry-run mode
/// where deletions are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionExecutor {
    dry_run: bool,
}

impl DeletionExecutor {
    /// Create an executor that deletes files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor that only logs what it would delete.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Resolve one group of duplicate paths.
    pub fn execute<S>(&self, filter: &S, members: &[PathBuf]) -> Result<DeletionReport, DeleteError>
    where
        S: KeepSelector + ?Sized,
    {
        if self.dry_run {
            delete_duplicates(filter, members, |path| {
                tracing::info!(path = %path.display(), "dry run, not deleting");
                Ok(())
            })
        } else {
            delete_duplicates(filter, members, |path| {
                remove_file(path)?;
                tracing::info!(path = %path.display(), "deleted");
                Ok(())
            })
        }
    }

    /// Resolve a duplicate group, counting the bytes its deletions free.
    pub fn execute_group<S>(
        &self,
        filter: &S,
        group: &DuplicateGroup,
    ) -> Result<DeletionReport, DeleteError>
    where
        S: KeepSelector + ?Sized,
    {
        let mut report = self.execute(filter, &group.paths)?;
        report.bytes_reclaimed = group.size * report.deleted.len() as u64;
        Ok(report)
    }
}
