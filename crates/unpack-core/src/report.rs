//! Extraction operation reporting.

use std::time::Duration;

/// Report of an archive extraction operation.
///
/// Only successful extractions produce a report; a failed run surfaces as an
/// [`ExtractionError`](crate::ExtractionError) instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directory entries materialized (created or reused).
    pub directories_created: usize,

    /// Entries dropped by stripping, glob rules or containment checks.
    pub entries_skipped: usize,

    /// Entries of a kind that is never materialized (symlinks, devices...).
    pub unsupported_entries: usize,

    /// Total payload bytes written to disk.
    pub bytes_written: u64,

    /// Duration of the extraction operation.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries that produced a filesystem object.
    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }

    /// Returns the number of entries that were seen but not materialized.
    #[must_use]
    pub const fn total_ignored(&self) -> usize {
        self.entries_skipped + self.unsupported_entries
    }
}
