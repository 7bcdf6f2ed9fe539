//! Discovery of numbered build directories under the builds root.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::{BuildId, SiteConfig};
use crate::{PagesError, PagesResult};

/// Parse a directory name as a build identifier.
///
/// Accepts exactly `width` ASCII digits, or more digits with a non-zero lead
/// (an identifier that outgrew the width). Anything else is not a build.
pub fn parse_build_id(name: &str, width: usize) -> Option<BuildId> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if name.len() < width || (name.len() > width && name.starts_with('0')) {
        return None;
    }
    name.parse::<u64>().ok().map(|n| BuildId::new(n, width))
}

/// Next unused identifier: one past the highest, or the first id when empty.
pub fn next_build_id(ids: &[BuildId], width: usize) -> BuildId {
    match ids.iter().max() {
        Some(max) => BuildId::new(max.number(), width).next(),
        None => BuildId::first(width),
    }
}

/// Result of a builds-root scan.
#[derive(Debug, Clone)]
pub struct BuildScan {
    pub root: PathBuf,
    pub width: usize,
    /// Ascending.
    pub ids: Vec<BuildId>,
}

impl BuildScan {
    pub fn next_id(&self) -> BuildId {
        next_build_id(&self.ids, self.width)
    }

    pub fn newest_first(&self) -> Vec<BuildId> {
        self.ids.iter().rev().copied().collect()
    }

    pub fn dir_of(&self, id: BuildId) -> PathBuf {
        self.root.join(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Enumerate build directories directly under the configured builds root.
///
/// A missing root is created (first run on a fresh site). Non-matching entries
/// are skipped silently; entries whose metadata cannot be read are logged and skipped.
pub fn scan_builds(config: &SiteConfig) -> PagesResult<BuildScan> {
    let root = config.builds_root();
    ensure_root(&root)?;

    let entries = fs::read_dir(&root).map_err(|e| {
        PagesError::Message(format!("failed to read builds root {}: {e}", root.display()))
    })?;

    let mut ids = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(id) = parse_build_id(name, config.id_width) else {
            debug!(name, "not a build directory name");
            continue;
        };
        // Follows symlinks, so a linked build directory still counts.
        match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_dir() => ids.push(id),
            Ok(_) => debug!(name, "numbered entry is not a directory"),
            Err(e) => warn!(name, error = %e, "skipping build entry with unreadable metadata"),
        }
    }

    ids.sort();
    ids.dedup();
    debug!(root = %root.display(), count = ids.len(), "scanned builds root");

    Ok(BuildScan {
        root,
        width: config.id_width,
        ids,
    })
}

fn ensure_root(root: &Path) -> PagesResult<()> {
    if root.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(root).map_err(|e| {
        PagesError::Message(format!("failed to create builds root {}: {e}", root.display()))
    })?;
    debug!(root = %root.display(), "created builds root");
    Ok(())
}
