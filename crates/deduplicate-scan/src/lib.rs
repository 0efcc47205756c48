//! Directory walking for deduplicate.
//!
//! This crate lists the candidate files that feed duplicate detection.
//! It walks a root with jwalk and returns the absolute path of every
//! regular file it reaches, in a stable sorted order.
//!
//! - **Deterministic order** so repeated runs group files identically
//! - **Ignore patterns** in glob syntax, pruning whole directories
//! - **Symlink policy** decided here; the detector treats every path it
//!   receives as an independent candidate
//!
//! # Example
//!
//! ```rust,no_run
//! use deduplicate_scan::{JwalkScanner, ScanConfig};
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let result = JwalkScanner::new().scan(&config).unwrap();
//!
//! println!("Found {} files", result.file_count());
//! for warning in &result.warnings {
//!     eprintln!("skipped {}: {}", warning.path.display(), warning.message);
//! }
//! ```

mod scanner;

pub use scanner::{JwalkScanner, ScanResult};

// Re-export core types for convenience
pub use deduplicate_core::{ScanConfig, ScanError, ScanWarning, WarningKind};
