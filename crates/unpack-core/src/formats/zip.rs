//! ZIP archive decoding.
//!
//! Entries are visited in central-directory order. Directory entries become
//! directories; every other entry, symlinks included, is written as a
//! regular file holding its decompressed payload. ZIP carries no ownership
//! the decoder relies on, so only caller overrides change owners.

use std::io;
use std::io::Read;
use std::io::Seek;

use log::debug;

use crate::ExtractionError;
use crate::Result;
use crate::extraction::ExtractionEngine;
use crate::types::EntryMetadata;

use super::traits::ArchiveFormat;

/// ZIP archive decoder. Requires a seekable source.
pub struct ZipArchive<R: Read + Seek> {
    inner: ::zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipArchive<R> {
    /// Opens the central directory of `source`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedArchive` if the central directory cannot be read.
    pub fn new(source: R) -> Result<Self> {
        let inner = ::zip::ZipArchive::new(source)
            .map_err(|e| ExtractionError::malformed("reading zip central directory", io::Error::from(e)))?;
        Ok(Self { inner })
    }
}

impl<R: Read + Seek> ArchiveFormat for ZipArchive<R> {
    fn extract(&mut self, engine: &mut ExtractionEngine) -> Result<()> {
        for index in 0..self.inner.len() {
            let mut file = self.inner.by_index(index).map_err(|e| {
                ExtractionError::malformed(format!("opening zip entry #{index}"), io::Error::from(e))
            })?;
            let name = file.name().to_string();
            let meta = EntryMetadata::with_mode(file.unix_mode());

            if file.is_dir() {
                engine.directory(&name, &meta)?;
            } else {
                engine.file(&name, &meta, &mut file)?;
            }
        }

        debug!("zip central directory exhausted ({} entries)", self.inner.len());
        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "zip"
    }
}
