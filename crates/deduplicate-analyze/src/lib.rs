//! Duplicate detection for deduplicate.
//!
//! Uses a three-stage cascade for efficiency:
//!
//! 1. Group files by size (metadata only, empty files dropped)
//! 2. Compute a SHA-256 of the first 1 KiB for size-matched files
//! 3. Compute a full SHA-256 for partial-hash matches
//!
//! ```rust,ignore
//! use deduplicate_analyze::DuplicateFinder;
//! use deduplicate_scan::{JwalkScanner, ScanConfig};
//!
//! let scan = JwalkScanner::new().scan(&ScanConfig::new("/path/to/scan"))?;
//!
//! let report = DuplicateFinder::new().find_duplicates(scan.files)?;
//!
//! println!("Found {} duplicate groups", report.group_count());
//! println!("Wasted space: {} bytes", report.total_wasted_space);
//! ```

mod duplicates;

pub use duplicates::{
    DuplicateConfig, DuplicateConfigBuilder, DuplicateConfigBuilderError, DuplicateFinder,
    DuplicateGroup, DuplicateReport, FindError, Stage, StageStats, group_by_key,
};

// Re-export core types
pub use deduplicate_core::{ContentHash, FileHandle, FingerprintError};
