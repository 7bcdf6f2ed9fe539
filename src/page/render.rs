//! Per-build page renderer and merger.
//!
//! `merge_page` is pure: existing page text plus fresh listing in, new page out.
//! Everything outside the info markers is regenerated on every run; the text
//! between them is carried over byte for byte.
//! All listing-derived strings are HTML-escaped; the info region never is.

use crate::core::{BuildListing, SiteConfig};
use crate::html_escape;

use super::region::{MarkerIssue, extract_region};

pub const FILES_START_MARKER: &str = "<!-- FILES_START -->";
pub const FILES_END_MARKER: &str = "<!-- FILES_END -->";
pub const GENERATED_AT_PREFIX: &str = "<p class=\"generated\">Generated at ";

/// Percent-encode a single URL path segment (RFC 3986 unreserved bytes pass through).
pub fn encode_path_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Human-readable size with one decimal, base 1024.
pub fn format_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

/// Where the info region of a rendered page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoSource {
    /// Copied from the existing page.
    Preserved,
    /// No existing page; placeholder used.
    NewPage,
    /// Existing page had unusable markers; placeholder used.
    Fallback(MarkerIssue),
}

impl InfoSource {
    pub fn is_preserved(&self) -> bool {
        matches!(self, InfoSource::Preserved)
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub info: InfoSource,
}

/// Region written on first run, so the markers sit on their own lines.
pub fn default_info_region(config: &SiteConfig) -> String {
    format!("\n{}\n", config.default_info)
}

/// Merge a fresh listing with the info region of `existing` (if any) into a new page.
pub fn merge_page(
    existing: Option<&str>,
    listing: &BuildListing,
    config: &SiteConfig,
    generated_at: &str,
) -> RenderedPage {
    let (region, info) = match existing {
        None => (default_info_region(config), InfoSource::NewPage),
        Some(content) => {
            match extract_region(content, &config.info_start_marker, &config.info_end_marker) {
                Ok(region) => (region.to_string(), InfoSource::Preserved),
                Err(issue) => (default_info_region(config), InfoSource::Fallback(issue)),
            }
        }
    };
    RenderedPage {
        html: render_build_page(listing, &region, config, generated_at),
        info,
    }
}

fn download_href(listing: &BuildListing, name: &str, config: &SiteConfig) -> String {
    let file = encode_path_segment(name);
    match config.download_base_url.as_deref() {
        Some(base) => format!("{}/{}/{}", base.trim_end_matches('/'), listing.id, file),
        None => format!("./{}", file),
    }
}

fn render_file_list(listing: &BuildListing, config: &SiteConfig) -> String {
    if listing.artifacts.is_empty() {
        return r#"<div class="empty-state">
<p>No artifact files found</p>
</div>"#
            .to_string();
    }
    listing
        .artifacts
        .iter()
        .map(|a| {
            let name = html_escape(&a.name);
            format!(
                r#"<div class="file-item">
<span class="file-name">{name}</span>
<span class="file-size" title="{bytes} bytes">{size}</span>
<a href="{href}" class="file-download" download="{name}">Download</a>
</div>"#,
                name = name,
                bytes = a.size_bytes,
                size = format_size(a.size_bytes),
                href = html_escape(&download_href(listing, &a.name, config)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a full build page around an already-chosen info region.
pub fn render_build_page(
    listing: &BuildListing,
    info_region: &str,
    config: &SiteConfig,
    generated_at: &str,
) -> String {
    let build_id = html_escape(&listing.id.to_string());
    let created = html_escape(listing.created_display());
    let file_count = listing.artifacts.len();
    let files = render_file_list(listing, config);
    let back_href = html_escape(&config.index_href_from_build());

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Build #{build_id}</title>
<style>
* {{ box-sizing: border-box; margin: 0; padding: 0; }}
body {{
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
  min-height: 100vh;
  padding: 2rem;
}}
.container {{ max-width: 1200px; margin: 0 auto; }}
.card {{ background: white; padding: 2rem; border-radius: 12px; box-shadow: 0 10px 30px rgba(0, 0, 0, 0.2); margin-bottom: 2rem; }}
.back-link {{ display: inline-block; color: #667eea; text-decoration: none; margin-bottom: 1rem; font-weight: 600; }}
.back-link:hover {{ text-decoration: underline; }}
h1 {{ color: #333; margin-bottom: 0.5rem; font-size: 2.5rem; }}
h2 {{ color: #333; margin-bottom: 1rem; font-size: 1.8rem; }}
.build-display {{ color: #666; font-size: 1.1rem; }}
.info-content {{ color: #555; line-height: 1.6; white-space: pre-wrap; }}
.file-list {{ display: flex; flex-direction: column; gap: 1rem; }}
.file-item {{ display: flex; justify-content: space-between; align-items: center; padding: 1rem; background: #f8f9fa; border-radius: 8px; }}
.file-item:hover {{ background: #e9ecef; }}
.file-name {{ font-weight: 600; color: #333; flex: 1; }}
.file-size {{ color: #666; margin: 0 1rem; }}
.file-download {{ padding: 0.5rem 1rem; background: #667eea; color: white; text-decoration: none; border-radius: 6px; }}
.file-download:hover {{ background: #5568d3; }}
.empty-state {{ text-align: center; padding: 2rem; color: #999; }}
.generated {{ color: rgba(255, 255, 255, 0.8); font-size: 0.8125rem; text-align: center; }}
</style>
</head>
<body>
<div class="container">
<div class="card header">
<a href="{back_href}" class="back-link">&larr; Back to all builds</a>
<h1>Build #{build_id}</h1>
<p class="build-display">Created: {created}</p>
</div>
<div class="card info-section">
<h2>Build Information</h2>
<div class="info-content">
{info_start}{info_region}{info_end}
</div>
</div>
<div class="card files-section">
<h2>Files ({file_count})</h2>
<div class="file-list">
{files_start}
{files}
{files_end}
</div>
</div>
{generated_prefix}{generated_at}</p>
</div>
</body>
</html>
"##,
        build_id = build_id,
        back_href = back_href,
        created = created,
        info_start = config.info_start_marker,
        info_region = info_region,
        info_end = config.info_end_marker,
        file_count = file_count,
        files_start = FILES_START_MARKER,
        files = files,
        files_end = FILES_END_MARKER,
        generated_prefix = GENERATED_AT_PREFIX,
        generated_at = html_escape(generated_at),
    )
}
