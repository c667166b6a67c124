//! Error conversion utilities for CLI.
//!
//! Converts unpack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use unpack_core::ExtractionError;

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, source: &str) -> anyhow::Error {
    match err {
        ExtractionError::UnsupportedFormat { location } => {
            anyhow!(
                "Archive format not supported: {location}\n\
                 HINT: Supported suffixes: .tar.gz, .tgz, .tar, .zip, .jar, .war (case-sensitive)"
            )
        }
        ExtractionError::SourceUnavailable { location, source: cause } => {
            anyhow!(
                "Cannot read archive '{location}': {cause}\n\
                 HINT: Check the URL or path. Bundled sources need --bundle NAME=DIR and --from-bundle NAME."
            )
        }
        ExtractionError::MalformedArchive { reason, source: cause } => {
            anyhow!(
                "Invalid archive '{source}': {reason}: {cause}\n\
                 HINT: The archive may be corrupted or truncated. Entries extracted before the failure were kept."
            )
        }
        ExtractionError::InvalidPattern { pattern, source: cause } => {
            anyhow!(
                "Invalid glob pattern '{pattern}': {cause}\n\
                 HINT: Quote patterns so the shell does not expand them."
            )
        }
        ExtractionError::UnknownPrincipal { kind, name } => {
            anyhow!(
                "Unknown {kind} '{name}' on this host\n\
                 HINT: Pass a numeric id or create the account first."
            )
        }
        ExtractionError::Filesystem { path, source: cause } => {
            let hint = if cause.kind() == std::io::ErrorKind::PermissionDenied {
                "\nHINT: Changing ownership usually requires root; try --no-same-owner."
            } else {
                ""
            };
            anyhow!(
                "Cannot write '{}' while extracting '{source}': {cause}{hint}",
                path.display()
            )
        }
        err @ ExtractionError::InvalidDestination { .. } => {
            anyhow::Error::from(err).context(format!("Error extracting '{source}'"))
        }
    }
}

/// Adds context to a generic error about archive operations
pub fn add_source_context<T>(
    result: Result<T, ExtractionError>,
    source: &str,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, source))
}
