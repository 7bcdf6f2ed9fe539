//! Site configuration passed explicitly into the scanner, renderer and index updater.

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::{PagesError, PagesResult};

pub const DEFAULT_ID_WIDTH: usize = 5;
pub const DEFAULT_BUILDS_DIR: &str = "builds";
pub const DEFAULT_PAGE_FILE: &str = "index.html";
pub const INFO_START_MARKER: &str = "<!-- INFO_START -->";
pub const INFO_END_MARKER: &str = "<!-- INFO_END -->";
pub const DEFAULT_INFO: &str =
    "No information added yet. Edit this HTML file to add build notes, changelog, or other details.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Directory holding the top-level index page.
    pub site_root: PathBuf,
    /// Builds root; relative paths are resolved against `site_root`.
    pub builds_dir: PathBuf,
    pub id_width: usize,
    pub page_file_name: String,
    pub index_file_name: String,
    pub info_start_marker: String,
    pub info_end_marker: String,
    /// Lowercase extensions without the dot. Empty lists every regular file.
    pub artifact_extensions: Vec<String>,
    pub default_info: String,
    pub download_base_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site_root: PathBuf::from("."),
            builds_dir: PathBuf::from(DEFAULT_BUILDS_DIR),
            id_width: DEFAULT_ID_WIDTH,
            page_file_name: DEFAULT_PAGE_FILE.to_string(),
            index_file_name: DEFAULT_PAGE_FILE.to_string(),
            info_start_marker: INFO_START_MARKER.to_string(),
            info_end_marker: INFO_END_MARKER.to_string(),
            artifact_extensions: vec!["jar".to_string()],
            default_info: DEFAULT_INFO.to_string(),
            download_base_url: None,
        }
    }
}

impl SiteConfig {
    /// Default configuration rooted at `site_root`.
    pub fn new(site_root: impl Into<PathBuf>) -> Self {
        SiteConfig {
            site_root: site_root.into(),
            ..SiteConfig::default()
        }
    }

    pub fn with_builds_dir(mut self, builds_dir: impl Into<PathBuf>) -> Self {
        self.builds_dir = builds_dir.into();
        self
    }

    pub fn with_id_width(mut self, width: usize) -> Self {
        self.id_width = width;
        self
    }

    pub fn with_artifact_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.artifact_extensions = exts.into_iter().map(|e| normalize_extension(e.as_ref())).collect();
        self
    }

    pub fn with_download_base_url(mut self, url: impl Into<String>) -> Self {
        self.download_base_url = Some(url.into());
        self
    }

    pub fn builds_root(&self) -> PathBuf {
        if self.builds_dir.is_absolute() {
            self.builds_dir.clone()
        } else {
            self.site_root.join(&self.builds_dir)
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.site_root.join(&self.index_file_name)
    }

    /// Builds root relative to `site_root`, or `None` when the pages could not link to each other.
    fn builds_dir_in_site(&self) -> Option<&Path> {
        let rel = if self.builds_dir.is_absolute() {
            self.builds_dir.strip_prefix(&self.site_root).ok()?
        } else {
            self.builds_dir.as_path()
        };
        rel.components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            .then_some(rel)
    }

    /// The builds root must live inside the site root so relative links between
    /// build pages and the index resolve.
    pub fn validate(&self) -> PagesResult<()> {
        if self.id_width == 0 {
            return Err(PagesError::Message("id_width must be at least 1".to_string()));
        }
        if self.builds_dir_in_site().is_none() {
            return Err(PagesError::Message(format!(
                "builds_dir {} is not inside site_root {}",
                self.builds_dir.display(),
                self.site_root.display()
            )));
        }
        Ok(())
    }

    /// Relative link from a build page back to the top-level index.
    pub fn index_href_from_build(&self) -> String {
        let depth = self
            .builds_dir_in_site()
            .map(|p| p.components().filter(|c| matches!(c, Component::Normal(_))).count())
            .unwrap_or(0)
            + 1;
        format!("{}{}", "../".repeat(depth), self.index_file_name)
    }

    /// Link from the top-level index to a build page.
    pub fn build_href_from_index(&self, id: &str) -> String {
        let mut parts: Vec<String> = self
            .builds_dir_in_site()
            .unwrap_or(Path::new(""))
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        parts.push(id.to_string());
        parts.push(self.page_file_name.clone());
        parts.join("/")
    }

    /// Whether `file_name` is a listable artifact (dot-files and the page itself never are).
    pub fn is_artifact_name(&self, file_name: &str) -> bool {
        if file_name.starts_with('.') || file_name == self.page_file_name {
            return false;
        }
        if self.artifact_extensions.is_empty() {
            return true;
        }
        match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let ext = ext.to_ascii_lowercase();
                self.artifact_extensions.iter().any(|e| *e == ext)
            }
            None => false,
        }
    }

    /// Load a TOML config file. `site_root` becomes the file's directory unless set.
    pub fn load(path: &Path) -> PagesResult<SiteConfig> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let config = raw.into_config(base);
        config.validate()?;
        Ok(config)
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    site_root: Option<PathBuf>,
    builds_dir: Option<PathBuf>,
    id_width: Option<usize>,
    page_file_name: Option<String>,
    index_file_name: Option<String>,
    info_start_marker: Option<String>,
    info_end_marker: Option<String>,
    artifact_extensions: Option<Vec<String>>,
    default_info: Option<String>,
    download_base_url: Option<String>,
}

impl RawConfig {
    fn into_config(self, base: PathBuf) -> SiteConfig {
        let d = SiteConfig::default();
        let site_root = match self.site_root {
            Some(p) if p.is_absolute() => p,
            Some(p) => base.join(p),
            None => base,
        };
        SiteConfig {
            site_root,
            builds_dir: self.builds_dir.unwrap_or(d.builds_dir),
            id_width: self.id_width.filter(|w| *w > 0).unwrap_or(d.id_width),
            page_file_name: self.page_file_name.unwrap_or(d.page_file_name),
            index_file_name: self.index_file_name.unwrap_or(d.index_file_name),
            info_start_marker: self.info_start_marker.unwrap_or(d.info_start_marker),
            info_end_marker: self.info_end_marker.unwrap_or(d.info_end_marker),
            artifact_extensions: self
                .artifact_extensions
                .map(|v| v.iter().map(|e| normalize_extension(e)).collect())
                .unwrap_or(d.artifact_extensions),
            default_info: self.default_info.unwrap_or(d.default_info),
            download_base_url: self.download_base_url.or(d.download_base_url),
        }
    }
}
