//! The session's single-slot error record.
//!
//! Every failing operation overwrites the slot; nothing is ever appended.
//! The record keeps the status code, where the failure was raised, a
//! free-form detail string, and (for entry-level failures) the coordinates
//! of the offending entry. A formatted report is rendered once at record
//! time so reading it back is free.

use std::fmt;
use std::panic::Location;

use sparsa_core::Info;

/// Source position at which an error was recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file path as reported by the compiler.
    pub file: &'static str,
    /// 1-based line number.
    pub line: u32,
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(loc: &'static Location<'static>) -> Self {
        Self {
            file: loc.file(),
            line: loc.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Coordinates of the entry an operation failed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryCoord {
    /// Row index.
    pub row: u64,
    /// Column index. Zero for vectors.
    pub col: u64,
    /// Whether the object was a matrix rather than a vector.
    pub is_matrix: bool,
}

impl fmt::Display for EntryCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_matrix {
            write!(f, "matrix entry ({}, {})", self.row, self.col)
        } else {
            write!(f, "vector entry ({})", self.row)
        }
    }
}

/// Most recent failure recorded on a session.
///
/// The default record has status [`Info::Success`] and no context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorRecord {
    status: Info,
    location: Option<SourceLocation>,
    detail: String,
    entry: Option<EntryCoord>,
    report: String,
}

impl ErrorRecord {
    pub(crate) fn new(
        status: Info,
        location: SourceLocation,
        detail: String,
        entry: Option<EntryCoord>,
    ) -> Self {
        let report = render(status, location, &detail, entry);
        Self {
            status,
            location: Some(location),
            detail,
            entry,
            report,
        }
    }

    /// Status code of the recorded failure.
    pub fn status(&self) -> Info {
        self.status
    }

    /// Where the failure was recorded.
    pub fn location(&self) -> Option<SourceLocation> {
        self.location
    }

    /// Free-form description supplied by the failing operation.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Offending entry, for entry-level failures.
    pub fn entry(&self) -> Option<EntryCoord> {
        self.entry
    }

    /// Human-readable report. Empty when nothing has been recorded.
    pub fn report(&self) -> &str {
        &self.report
    }

    /// Whether the slot holds a failure.
    pub fn is_set(&self) -> bool {
        !self.status.is_success()
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            f.write_str(&self.report)
        } else {
            f.write_str("no error")
        }
    }
}

fn render(status: Info, location: SourceLocation, detail: &str, entry: Option<EntryCoord>) -> String {
    let mut out = format!("sparsa: {status} (code {}) at {location}", status.code());
    if let Some(entry) = entry {
        out.push_str(&format!(" on {entry}"));
    }
    if !detail.is_empty() {
        out.push_str(": ");
        out.push_str(detail);
    }
    out
}
