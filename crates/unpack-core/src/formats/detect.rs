//! Archive format detection.

use std::fmt;

use crate::ExtractionError;
use crate::Result;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Gzip-compressed tar archive.
    TarGz,
    /// Tar archive (uncompressed).
    Tar,
    /// ZIP archive, including Java `.jar` and `.war` files.
    Zip,
}

impl FormatKind {
    /// Short lowercase name used in logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Tar => "tar",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Suffix table in priority order.
const SUFFIXES: &[(&str, FormatKind)] = &[
    (".tar.gz", FormatKind::TarGz),
    (".tgz", FormatKind::TarGz),
    (".tar", FormatKind::Tar),
    (".zip", FormatKind::Zip),
    (".jar", FormatKind::Zip),
    (".war", FormatKind::Zip),
];

/// Detects the archive format from a source location's name.
///
/// Only the suffix is consulted and the comparison is case-sensitive; the
/// archive content is never sniffed.
///
/// # Errors
///
/// Returns `UnsupportedFormat` if no suffix matches.
///
/// # Examples
///
/// ```
/// use unpack_core::formats::FormatKind;
/// use unpack_core::formats::detect_format;
///
/// assert_eq!(detect_format("https://example.com/app.tgz").unwrap(), FormatKind::TarGz);
/// assert!(detect_format("backup.tar.bz2").is_err());
/// ```
pub fn detect_format(location: &str) -> Result<FormatKind> {
    SUFFIXES
        .iter()
        .find(|(suffix, _)| location.ends_with(suffix))
        .map(|&(_, kind)| kind)
        .ok_or_else(|| ExtractionError::UnsupportedFormat {
            location: location.to_string(),
        })
}
