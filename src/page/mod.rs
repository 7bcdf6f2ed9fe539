//! Page Renderer/Merger for per-build listing pages.
//!
//! - `region`: marker-delimited region lookup and replacement
//! - `render`: pure page rendering and the info-region merge
//! - `build`: per-directory listing, read, merge and atomic write

pub mod build;
pub mod region;
pub mod render;

pub use build::{list_artifacts, read_existing_page, read_listing, write_build_page};
pub use region::{MarkerIssue, extract_region, locate_region, replace_region};
pub use render::{
    GENERATED_AT_PREFIX, InfoSource, RenderedPage, default_info_region, format_size, merge_page, render_build_page,
};
