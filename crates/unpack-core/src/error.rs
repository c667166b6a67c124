//! Error types for archive extraction operations.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Boxed error produced by a source collaborator (HTTP client, filesystem).
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during archive extraction.
///
/// Every error aborts the extraction it was raised from. Entries that were
/// materialized before the failure stay on disk; there is no rollback.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No decoder is registered for the source's declared name.
    #[error("unsupported archive format: {location}")]
    UnsupportedFormat {
        /// The location whose suffix did not match any decoder.
        location: String,
    },

    /// The source could not produce a readable stream.
    #[error("archive source unavailable: {location}")]
    SourceUnavailable {
        /// The source location (URL, path or bundled resource).
        location: String,
        /// Underlying cause.
        #[source]
        source: SourceError,
    },

    /// The archive stream is corrupt, truncated or has an unparseable header.
    #[error("malformed archive: {reason}")]
    MalformedArchive {
        /// What the decoder was doing when the stream failed.
        reason: String,
        /// Underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// A filesystem operation on the destination tree failed.
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An inclusion or exclusion pattern is not a valid glob.
    #[error("invalid glob pattern '{pattern}'")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Parser error.
        #[source]
        source: glob::PatternError,
    },

    /// A user or group name is not known on this host.
    #[error("unknown {kind} '{name}'")]
    UnknownPrincipal {
        /// `"user"` or `"group"`.
        kind: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// The destination root exists but is not a directory.
    #[error("destination is not a directory: {path}")]
    InvalidDestination {
        /// The destination root.
        path: PathBuf,
    },
}

impl ExtractionError {
    /// Wraps an I/O error raised while touching `path` on the destination.
    pub fn filesystem(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wraps an I/O error raised while reading the archive stream.
    pub fn malformed(reason: impl Into<String>, source: std::io::Error) -> Self {
        Self::MalformedArchive {
            reason: reason.into(),
            source,
        }
    }

    /// Wraps any collaborator error that kept a source from opening.
    pub fn source_unavailable(location: impl Into<String>, source: impl Into<SourceError>) -> Self {
        Self::SourceUnavailable {
            location: location.into(),
            source: source.into(),
        }
    }

    /// Returns `true` if the archive bytes could not be obtained.
    #[must_use]
    pub const fn is_source_error(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }

    /// Returns `true` if the destination tree could not be written.
    ///
    /// # Examples
    ///
    /// ```
    /// use unpack_core::ExtractionError;
    ///
    /// let err = ExtractionError::filesystem(
    ///     "/dst/file",
    ///     std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    /// );
    /// assert!(err.is_filesystem_error());
    ///
    /// let err = ExtractionError::UnsupportedFormat {
    ///     location: "archive.rar".into(),
    /// };
    /// assert!(!err.is_filesystem_error());
    /// ```
    #[must_use]
    pub const fn is_filesystem_error(&self) -> bool {
        matches!(
            self,
            Self::Filesystem { .. } | Self::InvalidDestination { .. }
        )
    }

    /// Returns `true` if the archive itself is broken.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedArchive { .. })
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use unpack_core::ExtractionError;
    ///
    /// let err = ExtractionError::UnsupportedFormat {
    ///     location: "archive.rar".into(),
    /// };
    /// assert_eq!(err.context(), Some("archive.rar"));
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::UnsupportedFormat { location } | Self::SourceUnavailable { location, .. } => {
                Some(location)
            }
            Self::MalformedArchive { reason, .. } => Some(reason),
            Self::InvalidPattern { pattern, .. } => Some(pattern),
            Self::UnknownPrincipal { name, .. } => Some(name),
            Self::Filesystem { .. } | Self::InvalidDestination { .. } => None,
        }
    }
}
