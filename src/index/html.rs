//! Top-level index page: the generated build list between the directory markers.
//!
//! Only the marker region is rewritten in an existing index, so hand-made
//! layout around it survives. A missing index is created from a default template.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::core::{IndexSummary, SiteConfig};
use crate::page::replace_region;
use crate::storage::write_atomic;
use crate::{PagesError, PagesResult, html_escape};

pub const DIRECTORIES_START_MARKER: &str = "<!-- DIRECTORIES_LIST_START -->";
pub const DIRECTORIES_END_MARKER: &str = "<!-- DIRECTORIES_LIST_END -->";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Render the build list (newest first), or an empty-state hint.
pub fn render_directory_list(summary: &IndexSummary, config: &SiteConfig) -> String {
    if summary.is_empty() {
        let first = crate::core::BuildId::first(config.id_width);
        return format!(
            r#"<div class="empty-state">
<p>No builds yet. Upload artifact files to {}/{}/ and run the generator.</p>
</div>"#,
            html_escape(&config.builds_dir.to_string_lossy()),
            first
        );
    }
    summary
        .entries
        .iter()
        .map(|entry| {
            let id = entry.id.to_string();
            let plural = if entry.file_count == 1 { "" } else { "s" };
            let created = entry.created.as_deref().unwrap_or("Unknown");
            format!(
                r#"<a href="{href}" class="directory-item">
<div class="directory-name">Build #{id}</div>
<div class="directory-files">{count} file{plural} &bull; {created}</div>
</a>"#,
                href = html_escape(&config.build_href_from_index(&id)),
                id = html_escape(&id),
                count = entry.file_count,
                plural = plural,
                created = html_escape(created),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn list_region(list_html: &str) -> String {
    format!("\n{}\n", list_html)
}

/// Index page written when none exists yet.
pub fn render_default_index(list_html: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Interim Builds</title>
<style>
* {{ box-sizing: border-box; margin: 0; padding: 0; }}
body {{
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
  min-height: 100vh;
  padding: 2rem;
}}
.container {{ max-width: 1200px; margin: 0 auto; background: white; padding: 2rem; border-radius: 12px; box-shadow: 0 10px 30px rgba(0, 0, 0, 0.2); }}
h1 {{ color: #333; margin-bottom: 1.5rem; font-size: 2.5rem; }}
.directory-list {{ display: flex; flex-direction: column; gap: 1rem; }}
.directory-item {{ display: block; padding: 1rem; background: #f8f9fa; border-radius: 8px; color: inherit; text-decoration: none; }}
.directory-item:hover {{ background: #e9ecef; }}
.directory-name {{ font-weight: 600; color: #333; }}
.directory-files {{ color: #666; font-size: 0.875rem; }}
.empty-state {{ text-align: center; padding: 2rem; color: #999; }}
</style>
</head>
<body>
<div class="container">
<h1>Interim Builds</h1>
<div class="directory-list">
{start}{list}{end}
</div>
</div>
</body>
</html>
"##,
        start = DIRECTORIES_START_MARKER,
        list = list_region(list_html),
        end = DIRECTORIES_END_MARKER,
    )
}

/// Pure merge: new index content from the existing one (if any).
///
/// Returns the marker problem when an existing index cannot be updated safely.
pub fn merge_index(existing: Option<&str>, list_html: &str) -> Result<String, crate::page::MarkerIssue> {
    match existing {
        None => Ok(render_default_index(list_html)),
        Some(content) => replace_region(
            content,
            DIRECTORIES_START_MARKER,
            DIRECTORIES_END_MARKER,
            &list_region(list_html),
        ),
    }
}

/// Refresh the build list in the top-level index page.
pub fn update_index(summary: &IndexSummary, config: &SiteConfig) -> PagesResult<(PathBuf, IndexOutcome)> {
    let path = config.index_path();
    let existing = match fs::read_to_string(&path) {
        Ok(s) => Some(s),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(PagesError::Message(format!(
                "failed to read index {}: {e}",
                path.display()
            )));
        }
    };

    let list_html = render_directory_list(summary, config);
    let content = merge_index(existing.as_deref(), &list_html).map_err(|issue| {
        PagesError::Message(format!("index {} not updated: {issue}", path.display()))
    })?;

    let outcome = match existing.as_deref() {
        None => IndexOutcome::Created,
        Some(old) if old == content => IndexOutcome::Unchanged,
        Some(_) => IndexOutcome::Updated,
    };
    if outcome == IndexOutcome::Unchanged {
        debug!(path = %path.display(), "index already up to date");
        return Ok((path, outcome));
    }

    write_atomic(&path, content.as_bytes()).map_err(|e| {
        PagesError::Message(format!("failed to write index {}: {e}", path.display()))
    })?;
    info!(path = %path.display(), builds = summary.entries.len(), ?outcome, "wrote index page");
    Ok((path, outcome))
}
