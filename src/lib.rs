pub mod core;
pub mod generate_cmd;
pub mod index;
pub mod page;
pub mod scan;
pub mod storage;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PagesError {
    #[error("{0}")]
    Message(String),
    /// A build directory (or its existing page) could not be read.
    #[error("failed to read build {id}: {source}")]
    Discovery {
        id: String,
        #[source]
        source: std::io::Error,
    },
    /// A page could not be written; the previous page is left as it was.
    #[error("failed to write page for build {id}: {source}")]
    Render {
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type PagesResult<T> = Result<T, PagesError>;

// Shared helpers

/// Escape text for HTML content and double-quoted attribute values.
pub fn html_escape(s: &str) -> String {
    s.chars().fold(String::with_capacity(s.len()), |mut out, c| {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
        out
    })
}

pub fn now_string() -> String {
    format_timestamp(time::OffsetDateTime::now_utc())
}

/// RFC 3339 in UTC with whole seconds, e.g. `2026-01-15T12:00:00Z`.
pub fn format_timestamp(ts: time::OffsetDateTime) -> String {
    let ts = ts.to_offset(time::UtcOffset::UTC);
    ts.replace_nanosecond(0)
        .unwrap_or(ts)
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
