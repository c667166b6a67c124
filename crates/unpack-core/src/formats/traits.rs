//! Common traits for archive format decoders.

use crate::Result;
use crate::extraction::ExtractionEngine;

/// Trait for archive format decoders.
///
/// A decoder walks its entries in archive order and hands each one to the
/// engine, which owns filtering and all filesystem work.
pub trait ArchiveFormat {
    /// Feeds every entry of the archive to `engine`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedArchive` if the stream cannot be decoded, or any
    /// error raised by the engine while materializing an entry.
    fn extract(&mut self, engine: &mut ExtractionEngine) -> Result<()>;

    /// Returns the archive format name.
    fn format_name(&self) -> &'static str;
}
