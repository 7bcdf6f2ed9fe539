//! Build Scanner: finds numbered build directories and the next free identifier.

pub mod scanner;

pub use scanner::{BuildScan, next_build_id, parse_build_id, scan_builds};
