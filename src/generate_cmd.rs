//! CLI command handler for the full scan-and-regenerate pass.
//!
//! Scans the builds root, regenerates every build page, refreshes the
//! top-level index and reports per-build results. A failing build is
//! reported and skipped; it never stops the pass.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::core::{BuildId, IndexEntry, IndexSummary, SiteConfig};
use crate::index::{IndexOutcome, update_index};
use crate::page::{InfoSource, read_listing, write_build_page};
use crate::scan::scan_builds;
use crate::{PagesError, PagesResult, now_string};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoStatus {
    Preserved,
    Default,
    Fallback,
}

impl From<InfoSource> for InfoStatus {
    fn from(source: InfoSource) -> Self {
        match source {
            InfoSource::Preserved => InfoStatus::Preserved,
            InfoSource::NewPage => InfoStatus::Default,
            InfoSource::Fallback(_) => InfoStatus::Fallback,
        }
    }
}

/// Outcome for one build directory.
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    pub id: BuildId,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<usize>,
    /// Total artifact size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<InfoStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BuildResult {
    fn failed(id: BuildId, err: &PagesError) -> Self {
        BuildResult {
            id,
            ok: false,
            files: None,
            bytes: None,
            info: None,
            error: Some(err.to_string()),
        }
    }

    /// One summary line, e.g. `ok   00003 (2 files, info preserved)`.
    pub fn summary_line(&self) -> String {
        if let Some(err) = &self.error {
            return format!("FAIL {}: {}", self.id, err);
        }
        let files = self.files.unwrap_or(0);
        let plural = if files == 1 { "" } else { "s" };
        let info = match self.info {
            Some(InfoStatus::Preserved) => "info preserved",
            Some(InfoStatus::Fallback) => "info reset, markers unusable",
            _ => "info default",
        };
        format!("ok   {} ({} file{}, {})", self.id, files, plural, info)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexResult {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<IndexOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Machine-readable summary of a run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub generated_at: String,
    pub builds_root: PathBuf,
    pub builds_found: usize,
    pub next_build_id: BuildId,
    /// Newest first.
    pub builds: Vec<BuildId>,
    pub results: Vec<BuildResult>,
    pub index: IndexResult,
    pub failures: usize,
}

impl GenerateReport {
    pub fn is_success(&self) -> bool {
        self.failures == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Run one full pass with an explicit generation timestamp.
///
/// Only an invalid config or an unreadable builds root is fatal; everything else is per build.
pub fn generate(config: &SiteConfig, generated_at: &str) -> PagesResult<GenerateReport> {
    config.validate()?;
    let scan = scan_builds(config)?;
    info!(root = %scan.root.display(), builds = scan.len(), next = %scan.next_id(), "scanned builds");

    let mut results = Vec::with_capacity(scan.len());
    let mut entries = Vec::with_capacity(scan.len());

    for id in scan.newest_first() {
        let dir = scan.dir_of(id);
        let listing = match read_listing(&dir, id, config) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(build = %id, error = %e, "skipping build");
                results.push(BuildResult::failed(id, &e));
                continue;
            }
        };
        entries.push(IndexEntry::from(&listing));

        match write_build_page(&listing, config, generated_at) {
            Ok((_, info)) => results.push(BuildResult {
                id,
                ok: true,
                files: Some(listing.artifacts.len()),
                bytes: Some(listing.total_bytes()),
                info: Some(info.into()),
                error: None,
            }),
            Err(e) => {
                warn!(build = %id, error = %e, "page left unchanged");
                results.push(BuildResult::failed(id, &e));
            }
        }
    }

    let summary = IndexSummary::from_entries(entries);
    let index = match update_index(&summary, config) {
        Ok((path, outcome)) => IndexResult {
            path,
            outcome: Some(outcome),
            error: None,
        },
        Err(e) => {
            warn!(error = %e, "index not updated");
            IndexResult {
                path: config.index_path(),
                outcome: None,
                error: Some(e.to_string()),
            }
        }
    };

    let failures = results.iter().filter(|r| !r.ok).count() + usize::from(index.error.is_some());

    Ok(GenerateReport {
        generated_at: generated_at.to_string(),
        builds_root: scan.root.clone(),
        builds_found: scan.len(),
        next_build_id: scan.next_id(),
        builds: scan.newest_first(),
        results,
        index,
        failures,
    })
}

/// Human-readable run summary, as printed by the CLI.
pub fn render_summary(report: &GenerateReport) -> String {
    let mut out = String::new();
    let noun = if report.builds_found == 1 { "directory" } else { "directories" };
    out.push_str(&format!("Found {} build {}\n", report.builds_found, noun));
    out.push_str(&format!("Next build ID will be: {}\n", report.next_build_id));
    for result in &report.results {
        out.push_str(&result.summary_line());
        out.push('\n');
    }
    match (&report.index.outcome, &report.index.error) {
        (_, Some(err)) => out.push_str(&format!("FAIL index: {}\n", err)),
        (Some(outcome), None) => {
            let verb = match outcome {
                IndexOutcome::Created => "created",
                IndexOutcome::Updated => "updated",
                IndexOutcome::Unchanged => "unchanged",
            };
            out.push_str(&format!("ok   index {} ({})\n", report.index.path.display(), verb));
        }
        (None, None) => {}
    }
    if report.is_success() {
        out.push_str("All pages generated successfully.\n");
    } else {
        out.push_str(&format!("{} failure(s).\n", report.failures));
    }
    out.push_str(&format!(
        "To add a new build, upload files to {}/ and run again.\n",
        report.builds_root.join(report.next_build_id.to_string()).display()
    ));
    out
}

fn write_json_report(report: &GenerateReport, path: &Path) -> PagesResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| {
                    PagesError::Message(format!("failed to create directory {}: {e}", parent.display()))
                })?;
        }
    }
    let json = serde_json::to_vec_pretty(report)
        .map_err(|e| PagesError::Message(format!("failed to serialize report: {e}")))?;
    std::fs::write(path, json)
        .map_err(|e| PagesError::Message(format!("failed to write report: {e}")))?;
    Ok(())
}

/// Run the generate command: full pass, printed summary, optional JSON report.
pub fn run(config: SiteConfig, json: Option<PathBuf>) -> PagesResult<GenerateReport> {
    let report = generate(&config, &now_string())?;
    print!("{}", render_summary(&report));
    if let Some(path) = json {
        write_json_report(&report, &path)?;
        info!(path = %path.display(), "wrote JSON report");
    }
    Ok(report)
}
