//! Duplicate file detection using staged content fingerprints.
//!
//! Uses a three-stage cascade for efficiency:
//! 1. Group files by size (metadata only)
//! 2. Group size-matched files by a SHA-256 of their first 1 KiB
//! 3. Group partial-hash matches by a SHA-256 of their full content
//!
//! Every stage drops groups with a single member, so each more expensive
//! fingerprint is only computed for files that could still be duplicates.

use std::hash::Hash;
use std::path::PathBuf;

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use deduplicate_core::{
    ContentHash, FileHandle, FingerprintError, HashSettings, PatternError, compile_patterns,
};

/// Errors that abort a duplicate search.
#[derive(Debug, Error)]
pub enum FindError {
    /// A candidate could not be fingerprinted. No partial result is kept.
    #[error("Failed to fingerprint candidate: {0}")]
    Fingerprint(#[from] FingerprintError),

    /// An exclude pattern did not compile.
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
}

/// Configuration for duplicate detection.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct DuplicateConfig {
    /// Prefix length and chunk size used for fingerprinting.
    #[builder(default)]
    #[serde(default)]
    pub hash: HashSettings,

    /// Minimum file size to consider. Empty files are never duplicates,
    /// whatever this is set to.
    #[builder(default = "1")]
    #[serde(default = "default_min_size")]
    pub min_size: u64,

    /// Maximum file size to consider.
    #[builder(default = "u64::MAX")]
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Glob patterns matched against the full path; matches are skipped.
    #[builder(default)]
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_min_size() -> u64 {
    1
}

fn default_max_size() -> u64 {
    u64::MAX
}

impl DuplicateConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(format!("min_size ({min}) exceeds max_size ({max})"));
            }
        }
        if let Some(ref patterns) = self.exclude_patterns {
            compile_patterns(patterns).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            hash: HashSettings::default(),
            min_size: 1,
            max_size: u64::MAX,
            exclude_patterns: Vec::new(),
        }
    }
}

impl DuplicateConfig {
    /// Create a new config builder.
    pub fn builder() -> DuplicateConfigBuilder {
        DuplicateConfigBuilder::default()
    }

    fn accepts_size(&self, size: u64) -> bool {
        size > 0 && size >= self.min_size && size <= self.max_size
    }
}

/// A group of byte-identical files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content hash shared by all files in this group.
    pub hash: ContentHash,

    /// Size of each file in bytes.
    pub size: u64,

    /// Paths to all duplicate files, in discovery order.
    pub paths: Vec<PathBuf>,

    /// Wasted space: size * (count - 1).
    pub wasted_bytes: u64,
}

impl DuplicateGroup {
    /// Get the number of duplicate files.
    pub fn count(&self) -> usize {
        self.paths.len()
    }

    /// Check if keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }
}

/// The three fingerprinting stages, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Size,
    PartialHash,
    FullHash,
}

/// How many candidates one stage received and kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    pub stage: Stage,
    /// Files entering the stage.
    pub input_files: usize,
    /// Files left in groups of two or more.
    pub surviving_files: usize,
    /// Groups of two or more after the stage.
    pub groups: usize,
}

impl StageStats {
    /// Files ruled out by this stage.
    pub fn eliminated(&self) -> usize {
        self.input_files - self.surviving_files
    }
}

/// Results from duplicate analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Duplicate groups keyed by full hash, in first-seen order.
    pub groups: IndexMap<ContentHash, DuplicateGroup>,

    /// Per-stage candidate counts, in stage order.
    pub stages: Vec<StageStats>,

    /// Number of candidates analyzed after exclusions.
    pub files_analyzed: u64,

    /// Total wasted space (could be reclaimed).
    pub total_wasted_space: u64,

    /// Number of files that have duplicates.
    pub files_with_duplicates: u64,
}

impl DuplicateReport {
    fn new(
        groups: IndexMap<ContentHash, DuplicateGroup>,
        stages: Vec<StageStats>,
        files_analyzed: u64,
    ) -> Self {
        let total_wasted_space = groups.values().map(|g| g.wasted_bytes).sum();
        let files_with_duplicates = groups.values().map(|g| g.paths.len() as u64).sum();
        Self {
            groups,
            stages,
            files_analyzed,
            total_wasted_space,
            files_with_duplicates,
        }
    }

    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Number of duplicate groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Look up a group by its full hash.
    pub fn get(&self, hash: &ContentHash) -> Option<&DuplicateGroup> {
        self.groups.get(hash)
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.values()
    }

    /// Groups ordered by reclaimable space, largest first. Ties keep
    /// first-seen order.
    pub fn by_wasted_space(&self) -> Vec<&DuplicateGroup> {
        let mut groups: Vec<&DuplicateGroup> = self.groups.values().collect();
        groups.sort_by(|a, b| b.wasted_bytes.cmp(&a.wasted_bytes));
        groups
    }

    /// Get total number of duplicate files across all groups.
    pub fn total_duplicate_files(&self) -> usize {
        self.groups.values().map(|g| g.paths.len()).sum()
    }
}

/// Duplicate file finder.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    config: DuplicateConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new duplicate finder with custom config.
    pub fn with_config(config: DuplicateConfig) -> Self {
        Self { config }
    }

    /// Find duplicates among the given candidate paths.
    ///
    /// The first fingerprinting failure aborts the search.
    pub fn find_duplicates<I, P>(&self, paths: I) -> Result<DuplicateReport, FindError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let exclude = compile_patterns(&self.config.exclude_patterns)?;
        let candidates: Vec<FileHandle> = paths
            .into_iter()
            .map(Into::<PathBuf>::into)
            .filter(|path: &PathBuf| !exclude.is_match(path))
            .map(|path| FileHandle::with_settings(path, self.config.hash))
            .collect();
        let files_analyzed = candidates.len() as u64;
        let mut stages = Vec::with_capacity(3);

        // Stage 1: size
        let input_files = candidates.len();
        let mut by_size = group_by_key(candidates, FileHandle::size)?;
        by_size.retain(|size, _| self.config.accepts_size(*size));
        stages.push(stage_stats(Stage::Size, input_files, &by_size));

        // Stage 2: partial hash
        let candidates = ungroup(by_size);
        let input_files = candidates.len();
        let by_partial = group_by_key(candidates, FileHandle::partial_hash)?;
        stages.push(stage_stats(Stage::PartialHash, input_files, &by_partial));

        // Stage 3: full hash
        let candidates = ungroup(by_partial);
        let input_files = candidates.len();
        let by_full = group_by_key(candidates, FileHandle::full_hash)?;
        stages.push(stage_stats(Stage::FullHash, input_files, &by_full));

        let mut groups = IndexMap::with_capacity(by_full.len());
        for (hash, members) in by_full {
            let size = members[0].size()?;
            let paths: Vec<PathBuf> = members.into_iter().map(FileHandle::into_path).collect();
            let wasted_bytes = size * (paths.len() as u64 - 1);
            groups.insert(
                hash,
                DuplicateGroup {
                    hash,
                    size,
                    paths,
                    wasted_bytes,
                },
            );
        }

        Ok(DuplicateReport::new(groups, stages, files_analyzed))
    }
}

/// Group files by a derived key and drop every group with a single member.
///
/// Keys keep the order in which they were first seen and each group keeps
/// the input order of its members. The first key derivation error aborts.
pub fn group_by_key<K, F>(
    files: impl IntoIterator<Item = FileHandle>,
    mut derive_key: F,
) -> Result<IndexMap<K, Vec<FileHandle>>, FingerprintError>
where
    K: Eq + Hash,
    F: FnMut(&FileHandle) -> Result<K, FingerprintError>,
{
    let mut groups: IndexMap<K, Vec<FileHandle>> = IndexMap::new();
    for file in files {
        let key = derive_key(&file)?;
        groups.entry(key).or_default().push(file);
    }
    groups.retain(|_, members| members.len() > 1);
    Ok(groups)
}

/// Flatten groups back into one candidate list, group by group.
fn ungroup<K>(groups: IndexMap<K, Vec<FileHandle>>) -> Vec<FileHandle> {
    groups.into_values().flatten().collect()
}

fn stage_stats<K>(
    stage: Stage,
    input_files: usize,
    groups: &IndexMap<K, Vec<FileHandle>>,
) -> StageStats {
    let stats = StageStats {
        stage,
        input_files,
        surviving_files: groups.values().map(Vec::len).sum(),
        groups: groups.len(),
    };
    tracing::debug!(
        stage = ?stats.stage,
        input = stats.input_files,
        surviving = stats.surviving_files,
        groups = stats.groups,
        "stage complete"
    );
    stats
}
