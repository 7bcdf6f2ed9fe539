//! Core types and configuration for interim-pages.
//!
//! `SiteConfig` is passed explicitly to every stage; there is no global state.

pub mod config;
pub mod schema;

// Re-export key types for convenience
pub use config::{DEFAULT_INFO, INFO_END_MARKER, INFO_START_MARKER, SiteConfig};
pub use schema::{ArtifactFile, BuildId, BuildListing, IndexEntry, IndexSummary};
