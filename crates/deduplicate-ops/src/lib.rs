//! Keep filters and deletion for deduplicate.
//!
//! A keep filter picks which members of a duplicate group survive; the
//! deletion executor checks that choice against the group and removes
//! everything else. Filters only select and never touch the filesystem
//! beyond reading metadata.

mod delete;
mod keep;
mod report;

pub use delete::{DeleteError, DeletionExecutor, delete_duplicates, remove_file};
pub use keep::{KeepError, KeepFilter, KeepSelector, ParseKeepFilterError};
pub use report::{DeletionFailure, DeletionReport};
