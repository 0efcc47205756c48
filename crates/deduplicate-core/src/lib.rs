//! Core types for deduplicate.
//!
//! This crate provides the building blocks shared by the rest of the
//! workspace: the memoizing [`FileHandle`] fingerprint provider, the
//! [`ContentHash`] digest type, scan and hashing configuration, and the
//! error types raised while fingerprinting or walking a tree.

mod config;
mod error;
mod handle;
mod hash;

pub use config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_PARTIAL_HASH_SIZE, HashSettings, HashSettingsBuilder,
    HashSettingsBuilderError, ScanConfig, ScanConfigBuilder, ScanConfigBuilderError,
    compile_patterns,
};
pub use error::{FingerprintError, PatternError, ScanError, ScanWarning, WarningKind};
pub use handle::FileHandle;
pub use hash::{ContentHash, ParseHashError};
