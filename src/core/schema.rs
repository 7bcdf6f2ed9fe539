//! Data model for build directories, their artifacts and the derived index summary.

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

/// Sequential build identifier, rendered zero-padded to `width` digits.
///
/// Numbers with more digits than `width` render in full; nothing is truncated.
#[derive(Debug, Clone, Copy)]
pub struct BuildId {
    number: u64,
    width: usize,
}

impl BuildId {
    pub fn new(number: u64, width: usize) -> Self {
        BuildId { number, width }
    }

    /// The first identifier handed out in an empty builds root.
    pub fn first(width: usize) -> Self {
        BuildId::new(1, width)
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn next(&self) -> Self {
        BuildId::new(self.number.saturating_add(1), self.width)
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.number, width = self.width)
    }
}

impl PartialEq for BuildId {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for BuildId {}

impl PartialOrd for BuildId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BuildId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number)
    }
}

impl Serialize for BuildId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single uploaded file inside a build directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFile {
    pub name: String,
    pub size_bytes: u64,
}

impl ArtifactFile {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        ArtifactFile {
            name: name.into(),
            size_bytes,
        }
    }
}

/// Fresh on-disk state of one build directory, as rendered into its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildListing {
    pub id: BuildId,
    pub dir: PathBuf,
    /// Directory creation time (RFC 3339), `None` when the platform does not report it.
    pub created: Option<String>,
    /// Sorted by name.
    pub artifacts: Vec<ArtifactFile>,
}

impl BuildListing {
    pub fn created_display(&self) -> &str {
        self.created.as_deref().unwrap_or("Unknown")
    }

    pub fn total_bytes(&self) -> u64 {
        self.artifacts.iter().map(|a| a.size_bytes).sum()
    }
}

/// One row of the top-level index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub id: BuildId,
    pub file_count: usize,
    pub created: Option<String>,
}

impl From<&BuildListing> for IndexEntry {
    fn from(listing: &BuildListing) -> Self {
        IndexEntry {
            id: listing.id,
            file_count: listing.artifacts.len(),
            created: listing.created.clone(),
        }
    }
}

/// All discovered builds, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub entries: Vec<IndexEntry>,
}

impl IndexSummary {
    pub fn from_entries(mut entries: Vec<IndexEntry>) -> Self {
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        IndexSummary { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
