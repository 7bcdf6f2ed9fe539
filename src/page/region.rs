//! Marker-delimited regions inside generated pages.
//!
//! A region is usable only when the start and end markers each occur exactly
//! once, start before end. Anything else is reported as a `MarkerIssue` and
//! callers fall back; it is never a hard error.

use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIssue {
    MissingStart,
    MissingEnd,
    DuplicateStart,
    DuplicateEnd,
    EndBeforeStart,
}

impl MarkerIssue {
    /// Whether the markers are present but in an unusable arrangement.
    pub fn is_ambiguous(&self) -> bool {
        !matches!(self, MarkerIssue::MissingStart | MarkerIssue::MissingEnd)
    }
}

impl fmt::Display for MarkerIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarkerIssue::MissingStart => "start marker missing",
            MarkerIssue::MissingEnd => "end marker missing",
            MarkerIssue::DuplicateStart => "start marker appears more than once",
            MarkerIssue::DuplicateEnd => "end marker appears more than once",
            MarkerIssue::EndBeforeStart => "end marker appears before start marker",
        };
        f.write_str(s)
    }
}

/// Byte range strictly between the two markers.
pub fn locate_region(content: &str, start: &str, end: &str) -> Result<Range<usize>, MarkerIssue> {
    let s = content.find(start).ok_or(MarkerIssue::MissingStart)?;
    let e = content.find(end).ok_or(MarkerIssue::MissingEnd)?;
    if content.matches(start).count() > 1 {
        return Err(MarkerIssue::DuplicateStart);
    }
    if content.matches(end).count() > 1 {
        return Err(MarkerIssue::DuplicateEnd);
    }
    let inner_start = s + start.len();
    if e < inner_start {
        return Err(MarkerIssue::EndBeforeStart);
    }
    Ok(inner_start..e)
}

/// The text between the markers, verbatim.
pub fn extract_region<'a>(content: &'a str, start: &str, end: &str) -> Result<&'a str, MarkerIssue> {
    locate_region(content, start, end).map(|r| &content[r])
}

/// Copy of `content` with the text between the markers replaced by `inner`.
pub fn replace_region(content: &str, start: &str, end: &str, inner: &str) -> Result<String, MarkerIssue> {
    let range = locate_region(content, start, end)?;
    let mut out = String::with_capacity(content.len() - range.len() + inner.len());
    out.push_str(&content[..range.start]);
    out.push_str(inner);
    out.push_str(&content[range.end..]);
    Ok(out)
}
