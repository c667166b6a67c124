//! Policy-driven archive extraction.
//!
//! `unpack-core` materializes TAR, gzip-compressed TAR and ZIP archives into
//! a destination directory while applying a caller-supplied policy:
//!
//! - leading path components stripped from every entry
//! - glob exclusions, with inclusions that re-admit excluded entries
//! - owner, group and mode overrides for files and directories
//!
//! Archives come from a [`source::SourceResolver`]: remote URLs (downloaded
//! into a cache directory), `file://` paths, or files shipped in named
//! bundles. Re-extracting the same archive with the same options yields the
//! same tree. No entry is ever written outside the destination root.
//!
//! The crate targets Unix hosts: ownership and permission bits are applied
//! through POSIX APIs.
//!
//! # Examples
//!
//! ```no_run
//! use unpack_core::ExtractionOptions;
//! use unpack_core::source::SourceResolver;
//! use unpack_core::unpack;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = SourceResolver::new("/var/cache/unpack");
//! let options = ExtractionOptions::default()
//!     .with_strip_components(1)
//!     .with_excludes(vec!["docs/*".into()]);
//!
//! let report = unpack(
//!     "https://example.com/app-1.0.tar.gz",
//!     None,
//!     &resolver,
//!     "/opt/app",
//!     &options,
//! )?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(unix))]
compile_error!("unpack-core supports Unix targets only");

pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod filter;
pub mod formats;
pub mod materialize;
pub mod permissions;
pub mod report;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export main API types
pub use api::extract;
pub use api::extract_archive;
pub use api::extract_reader;
pub use api::unpack;
pub use config::ExtractionOptions;
pub use error::ExtractionError;
pub use error::Result;
pub use report::ExtractionReport;

// Re-export types module for easier access
pub use formats::FormatKind;
pub use source::ArchiveSource;
pub use source::SourceKind;
pub use source::SourceResolver;
pub use types::DestDir;
pub use types::Principal;
