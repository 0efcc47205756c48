//! Keep filters: which members of a duplicate group to retain.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use thiserror::Error;

/// Errors raised while selecting the members to keep.
#[derive(Debug, Error)]
pub enum KeepError {
    /// A 1-based position outside `[1, len]`.
    #[error("Position {position} is out of range, expected 1 to {len}")]
    PositionOutOfRange { position: usize, len: usize },

    /// Metadata needed for the selection could not be read.
    #[error("Cannot read metadata of {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Built-in keep filters.
///
/// Every variant returns a subset of the members it is given. Filters that
/// pick a single member resolve ties to the first candidate in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepFilter {
    /// Keep the member at this 1-based position.
    Position(usize),
    /// Keep the most recently modified member.
    LastModified,
    /// Keep the least recently modified member.
    FirstModified,
    /// Keep the member with the fewest path components.
    Shallowest,
    /// Keep the member with the most path components.
    Deepest,
    /// Keep every member.
    All,
    /// Keep no member.
    None,
}

impl KeepFilter {
    /// Keep the member at 1-based position `k`. The range is checked
    /// against the group at selection time.
    pub fn position(k: usize) -> Self {
        Self::Position(k)
    }

    /// Select the members to keep.
    pub fn select(&self, members: &[PathBuf]) -> Result<Vec<PathBuf>, KeepError> {
        match *self {
            Self::Position(position) => {
                if position == 0 || position > members.len() {
                    return Err(KeepError::PositionOutOfRange {
                        position,
                        len: members.len(),
                    });
                }
                Ok(vec![members[position - 1].clone()])
            }
            Self::LastModified => first_best(members, modified, |a, b| a > b),
            Self::FirstModified => first_best(members, modified, |a, b| a < b),
            Self::Shallowest => first_best(members, depth, |a, b| a < b),
            Self::Deepest => first_best(members, depth, |a, b| a > b),
            Self::All => Ok(members.to_vec()),
            Self::None => Ok(Vec::new()),
        }
    }
}

impl fmt::Display for KeepFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(k) => write!(f, "position {k}"),
            Self::LastModified => write!(f, "last-modified"),
            Self::FirstModified => write!(f, "first-modified"),
            Self::Shallowest => write!(f, "shallowest"),
            Self::Deepest => write!(f, "deepest"),
            Self::All => write!(f, "all"),
            Self::None => write!(f, "none"),
        }
    }
}

/// An unrecognized filter name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Unknown keep filter {input:?}, expected one of: last-modified, first-modified, shallowest, deepest"
)]
pub struct ParseKeepFilterError {
    pub input: String,
}

impl FromStr for KeepFilter {
    type Err = ParseKeepFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-modified" => Ok(Self::LastModified),
            "first-modified" => Ok(Self::FirstModified),
            "shallowest" => Ok(Self::Shallowest),
            "deepest" => Ok(Self::Deepest),
            _ => Err(ParseKeepFilterError {
                input: s.to_string(),
            }),
        }
    }
}

/// Anything that can choose the members of a group to keep.
///
/// Implemented by [`KeepFilter`] and by plain closures, so callers can plug
/// in their own selection (an interactive prompt, a test double).
pub trait KeepSelector {
    fn select(&self, members: &[PathBuf]) -> Result<Vec<PathBuf>, KeepError>;
}

impl KeepSelector for KeepFilter {
    fn select(&self, members: &[PathBuf]) -> Result<Vec<PathBuf>, KeepError> {
        KeepFilter::select(self, members)
    }
}

impl<F> KeepSelector for F
where
    F: Fn(&[PathBuf]) -> Result<Vec<PathBuf>, KeepError>,
{
    fn select(&self, members: &[PathBuf]) -> Result<Vec<PathBuf>, KeepError> {
        self(members)
    }
}

/// Pick the single member whose key is strictly better than every earlier
/// one, so ties stay with the first candidate.
fn first_best<K, F, B>(
    members: &[PathBuf],
    mut key: F,
    better: B,
) -> Result<Vec<PathBuf>, KeepError>
where
    F: FnMut(&Path) -> Result<K, KeepError>,
    B: Fn(&K, &K) -> bool,
{
    let mut best: Option<(&PathBuf, K)> = None;
    for member in members {
        let candidate = key(member)?;
        let replace = match &best {
            Some((_, current)) => better(&candidate, current),
            None => true,
        };
        if replace {
            best = Some((member, candidate));
        }
    }
    Ok(best.map(|(path, _)| vec![path.clone()]).unwrap_or_default())
}

fn modified(path: &Path) -> Result<SystemTime, KeepError> {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|source| KeepError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn depth(path: &Path) -> Result<usize, KeepError> {
    Ok(path.components().count())
}
