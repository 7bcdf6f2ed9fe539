//! Filesystem side of page regeneration for a single build directory.
//!
//! read listing -> read existing page -> merge -> atomic write. Each build is
//! independent; errors are returned per build and never touch other builds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::{ArtifactFile, BuildId, BuildListing, SiteConfig};
use crate::storage::write_atomic;
use crate::{PagesError, PagesResult, format_timestamp};

use super::render::{InfoSource, merge_page};

/// List artifact files in `dir`, sorted by name, with sizes.
///
/// Subdirectories, dot-files and the generated page are ignored, as are entries
/// whose metadata cannot be read. Only a failure to read the directory itself is an error.
pub fn list_artifacts(dir: &Path, config: &SiteConfig) -> io::Result<Vec<ArtifactFile>> {
    let mut artifacts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            warn!(dir = %dir.display(), name = ?name, "skipping file with non UTF-8 name");
            continue;
        };
        if !config.is_artifact_name(name) {
            continue;
        }
        // Follows symlinks; a dangling link or a file removed mid-scan is not a file.
        let meta = match fs::metadata(entry.path()) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), name, "entry vanished or dangling link, skipping");
                continue;
            }
            Err(e) => {
                warn!(dir = %dir.display(), name, error = %e, "skipping entry with unreadable metadata");
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }
        artifacts.push(ArtifactFile::new(name, meta.len()));
    }
    artifacts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(artifacts)
}

fn created_time(dir: &Path) -> Option<String> {
    let created = fs::metadata(dir).ok()?.created().ok()?;
    Some(format_timestamp(time::OffsetDateTime::from(created)))
}

/// Snapshot the current contents of a build directory.
pub fn read_listing(dir: &Path, id: BuildId, config: &SiteConfig) -> PagesResult<BuildListing> {
    let artifacts = list_artifacts(dir, config).map_err(|source| PagesError::Discovery {
        id: id.to_string(),
        source,
    })?;
    Ok(BuildListing {
        id,
        dir: dir.to_path_buf(),
        created: created_time(dir),
        artifacts,
    })
}

/// Read a previously generated page. `Ok(None)` when there is none.
///
/// A page that is not valid UTF-8 is an error: overwriting it could lose the info region.
pub fn read_existing_page(path: &Path, id: BuildId) -> PagesResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PagesError::Discovery {
            id: id.to_string(),
            source,
        }),
    }
}

/// Merge and write the page for an already-read listing.
pub fn write_build_page(
    listing: &BuildListing,
    config: &SiteConfig,
    generated_at: &str,
) -> PagesResult<(PathBuf, InfoSource)> {
    let id = listing.id;
    let page_path = listing.dir.join(&config.page_file_name);
    let existing = read_existing_page(&page_path, id)?;

    let rendered = merge_page(existing.as_deref(), listing, config, generated_at);
    match rendered.info {
        InfoSource::Fallback(issue) if issue.is_ambiguous() => {
            warn!(build = %id, %issue, "info markers ambiguous, writing default info section")
        }
        InfoSource::Fallback(issue) => {
            warn!(build = %id, %issue, "info markers missing, writing default info section")
        }
        InfoSource::NewPage => debug!(build = %id, "no existing page, writing default info section"),
        InfoSource::Preserved => debug!(build = %id, "preserved info section"),
    }

    write_atomic(&page_path, rendered.html.as_bytes()).map_err(|source| PagesError::Render {
        id: id.to_string(),
        source,
    })?;
    info!(build = %id, files = listing.artifacts.len(), path = %page_path.display(), "wrote build page");

    Ok((page_path, rendered.info))
}
