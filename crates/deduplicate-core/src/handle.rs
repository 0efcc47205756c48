//! Memoizing file fingerprint provider.

use std::cell::OnceCell;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::HashSettings;
use crate::error::FingerprintError;
use crate::hash::ContentHash;

/// One candidate file and its lazily computed fingerprints.
///
/// Size, partial hash and full hash are each computed on first request and
/// then served from cache for the lifetime of the handle. File content is
/// assumed not to change during a run; nothing is ever recomputed.
#[derive(Debug, Clone)]
pub struct FileHandle {
    path: PathBuf,
    settings: HashSettings,
    size: OnceCell<u64>,
    partial_hash: OnceCell<ContentHash>,
    full_hash: OnceCell<ContentHash>,
}

impl FileHandle {
    /// Create a handle using the default hash settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_settings(path, HashSettings::default())
    }

    /// Create a handle with custom prefix and chunk sizes.
    pub fn with_settings(path: impl Into<PathBuf>, settings: HashSettings) -> Self {
        Self {
            path: path.into(),
            settings,
            size: OnceCell::new(),
            partial_hash: OnceCell::new(),
            full_hash: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// File size in bytes, from metadata only.
    pub fn size(&self) -> Result<u64, FingerprintError> {
        memoized(&self.size, || {
            let metadata =
                std::fs::metadata(&self.path).map_err(|e| FingerprintError::io(&self.path, e))?;
            Ok(metadata.len())
        })
    }

    /// Digest of the first `min(size, partial_hash_size)` bytes.
    pub fn partial_hash(&self) -> Result<ContentHash, FingerprintError> {
        memoized(&self.partial_hash, || {
            let file = self.open()?;
            let mut head = Vec::with_capacity(self.settings.partial_hash_size);
            file.take(self.settings.partial_hash_size as u64)
                .read_to_end(&mut head)
                .map_err(|e| FingerprintError::io(&self.path, e))?;

            tracing::trace!(path = %self.path.display(), bytes = head.len(), "partial hash");
            Ok(ContentHash::of(&head))
        })
    }

    /// Digest of the entire content, streamed in `chunk_size` reads.
    pub fn full_hash(&self) -> Result<ContentHash, FingerprintError> {
        memoized(&self.full_hash, || {
            let mut file = self.open()?;
            let mut hasher = Sha256::new();
            let mut buffer = vec![0u8; self.settings.chunk_size];
            let mut total: u64 = 0;

            loop {
                let bytes_read = match file.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(FingerprintError::io(&self.path, e)),
                };
                hasher.update(&buffer[..bytes_read]);
                total += bytes_read as u64;
            }

            tracing::trace!(path = %self.path.display(), bytes = total, "full hash");
            Ok(ContentHash::from_hasher(hasher))
        })
    }

    /// Size if it has already been computed.
    pub fn cached_size(&self) -> Option<u64> {
        self.size.get().copied()
    }

    /// Partial hash if it has already been computed.
    pub fn cached_partial_hash(&self) -> Option<ContentHash> {
        self.partial_hash.get().copied()
    }

    /// Full hash if it has already been computed.
    pub fn cached_full_hash(&self) -> Option<ContentHash> {
        self.full_hash.get().copied()
    }

    fn open(&self) -> Result<File, FingerprintError> {
        File::open(&self.path).map_err(|e| FingerprintError::io(&self.path, e))
    }
}

fn memoized<T: Copy>(
    cell: &OnceCell<T>,
    compute: impl FnOnce() -> Result<T, FingerprintError>,
) -> Result<T, FingerprintError> {
    if let Some(value) = cell.get() {
        return Ok(*value);
    }
    let value = compute()?;
    Ok(*cell.get_or_init(|| value))
}
