//! Outcome of deleting the extra copies of duplicate groups.

use std::path::PathBuf;

/// A member that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    /// The path that failed.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl DeletionFailure {
    pub fn new(path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for DeletionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Result of resolving one or more duplicate groups.
#[derive(Debug, Clone, Default)]
pub struct DeletionReport {
    /// Members the keep filter retained.
    pub kept: Vec<PathBuf>,
    /// Members removed, in deletion order.
    pub deleted: Vec<PathBuf>,
    /// Members whose deletion failed. Nothing is rolled back.
    pub failures: Vec<DeletionFailure>,
    /// Bytes freed by the successful deletions, when the member size is known.
    pub bytes_reclaimed: u64,
}

impl DeletionReport {
    /// Check if every attempted deletion succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Fold another group's outcome into this one.
    pub fn merge(&mut self, other: DeletionReport) {
        self.kept.extend(other.kept);
        self.deleted.extend(other.deleted);
        self.failures.extend(other.failures);
        self.bytes_reclaimed += other.bytes_reclaimed;
    }

    /// Get a human-readable summary of the deletions.
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            format!("Deleted {} files", self.deleted.len())
        } else {
            format!(
                "Deleted {} files, {} failed",
                self.deleted.len(),
                self.failures.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut report = DeletionReport {
            deleted: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            ..Default::default()
        };
        assert!(report.is_success());
        assert_eq!(report.summary(), "Deleted 2 files");

        report
            .failures
            .push(DeletionFailure::new(PathBuf::from("/c"), "Permission denied"));
        assert!(!report.is_success());
        assert_eq!(report.summary(), "Deleted 2 files, 1 failed");
        assert_eq!(report.failures[0].to_string(), "/c: Permission denied");
    }

    #[test]
    fn test_merge() {
        let mut total = DeletionReport::default();
        total.merge(DeletionReport {
            kept: vec![PathBuf::from("/keep")],
            deleted: vec![PathBuf::from("/gone")],
            failures: Vec::new(),
            bytes_reclaimed: 10,
        });
        total.merge(DeletionReport {
            kept: vec![PathBuf::from("/keep2")],
            deleted: vec![PathBuf::from("/gone2"), PathBuf::from("/gone3")],
            failures: Vec::new(),
            bytes_reclaimed: 40,
        });

        assert_eq!(total.kept.len(), 2);
        assert_eq!(total.deleted_count(), 3);
        assert_eq!(total.failed_count(), 0);
        assert_eq!(total.bytes_reclaimed, 50);
    }
}
