//! TAR archive decoding.
//!
//! Entries are read in raw mode so that name-extension records reach this
//! decoder instead of being folded into the following header by the `tar`
//! crate:
//!
//! - GNU long-name records (`L`, conventionally named `././@LongLink`) carry
//!   the full name of the next entry
//! - PAX local headers (`x`) may carry a `path` record with the same role
//! - GNU long-link-target (`K`) records and PAX global headers are consumed
//!
//! Only directories and regular files are materialized. Symlinks, hardlinks,
//! devices and FIFOs are skipped.

use std::io;
use std::io::Read;

use log::debug;

use crate::ExtractionError;
use crate::Result;
use crate::extraction::ExtractionEngine;
use crate::types::EntryKind;
use crate::types::EntryMetadata;

use super::traits::ArchiveFormat;

/// Header name GNU tar gives to long-name extension records.
pub const LONG_LINK_NAME: &str = "././@LongLink";

/// TAR archive decoder over any byte stream.
///
/// Wrap the stream in `flate2::read::GzDecoder` for `.tar.gz` sources.
pub struct TarArchive<R: Read> {
    inner: tar::Archive<R>,
}

impl<R: Read> TarArchive<R> {
    /// Creates a decoder reading from `source`.
    #[must_use]
    pub fn new(source: R) -> Self {
        Self {
            inner: tar::Archive::new(source),
        }
    }
}

impl<R: Read> ArchiveFormat for TarArchive<R> {
    fn extract(&mut self, engine: &mut ExtractionEngine) -> Result<()> {
        let entries = self
            .inner
            .entries()
            .map_err(|e| ExtractionError::malformed("reading tar stream", e))?
            .raw(true);

        // Name carried by a preceding extension record, if any.
        let mut pending_name: Option<String> = None;

        for entry in entries {
            let mut entry = entry.map_err(|e| ExtractionError::malformed("reading tar header", e))?;
            let entry_type = entry.header().entry_type();
            let header_name = String::from_utf8_lossy(&entry.header().path_bytes()).into_owned();

            if entry_type.is_gnu_longname()
                || (header_name == LONG_LINK_NAME && !entry_type.is_gnu_longlink())
            {
                pending_name = Some(read_long_name(&mut entry)?);
                continue;
            }
            if entry_type.is_gnu_longlink() || entry_type.is_pax_global_extensions() {
                continue;
            }
            if entry_type.is_pax_local_extensions() {
                if let Some(path) = pax_path(&mut entry)? {
                    pending_name = Some(path);
                }
                continue;
            }

            let name = pending_name.take().unwrap_or(header_name);
            let kind = classify(entry_type);
            let meta = if kind == EntryKind::Other {
                EntryMetadata::default()
            } else {
                metadata(entry.header())?
            };

            let expected = entry.size();
            let mut payload = ExactReader::new(&mut entry, expected);
            engine.entry(&name, kind, &meta, &mut payload)?;
        }

        debug!("tar stream exhausted");
        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "tar"
    }
}

fn classify(entry_type: tar::EntryType) -> EntryKind {
    if entry_type.is_dir() {
        EntryKind::Directory
    } else if entry_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

fn read_long_name<R: Read>(entry: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    entry
        .read_to_end(&mut buf)
        .map_err(|e| ExtractionError::malformed("reading long name record", e))?;
    Ok(trim_name(&String::from_utf8_lossy(&buf)).to_string())
}

fn pax_path<R: Read>(entry: &mut tar::Entry<'_, R>) -> Result<Option<String>> {
    let Some(extensions) = entry
        .pax_extensions()
        .map_err(|e| ExtractionError::malformed("reading pax header", e))?
    else {
        return Ok(None);
    };

    let mut path = None;
    for extension in extensions {
        let extension =
            extension.map_err(|e| ExtractionError::malformed("parsing pax record", e))?;
        if extension.key() == Ok("path") {
            path = Some(trim_name(&String::from_utf8_lossy(extension.value_bytes())).to_string());
        }
    }
    Ok(path)
}

fn trim_name(name: &str) -> &str {
    name.trim_matches(|c: char| c == '\0' || c.is_whitespace())
}

fn metadata(header: &tar::Header) -> Result<EntryMetadata> {
    let mode = header
        .mode()
        .map_err(|e| ExtractionError::malformed("reading tar mode field", e))?;
    let uid = header
        .uid()
        .map_err(|e| ExtractionError::malformed("reading tar uid field", e))?;
    let gid = header
        .gid()
        .map_err(|e| ExtractionError::malformed("reading tar gid field", e))?;

    Ok(EntryMetadata {
        uid: u32::try_from(uid).ok(),
        gid: u32::try_from(gid).ok(),
        user_name: symbolic(header.username_bytes()),
        group_name: symbolic(header.groupname_bytes()),
        mode: Some(mode & 0o7777),
    })
}

fn symbolic(bytes: Option<&[u8]>) -> Option<String> {
    let name = trim_name(&String::from_utf8_lossy(bytes?)).to_string();
    (!name.is_empty()).then_some(name)
}

/// Reader that turns an early end of stream into an error.
///
/// The `tar` crate hands out a plain length-limited view of the stream, so
/// a truncated final entry would otherwise look like a short file.
struct ExactReader<'a, R: Read + ?Sized> {
    inner: &'a mut R,
    remaining: u64,
}

impl<'a, R: Read + ?Sized> ExactReader<'a, R> {
    const fn new(inner: &'a mut R, expected: u64) -> Self {
        Self {
            inner,
            remaining: expected,
        }
    }
}

impl<R: Read + ?Sized> Read for ExactReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let n = self.inner.read(buf)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("entry data truncated, {} bytes missing", self.remaining),
            ));
        }
        self.remaining = self.remaining.saturating_sub(n as u64);
        Ok(n)
    }
}
