//! Core extraction engine.
//!
//! Decoders walk their archive and hand each entry to the engine; the engine
//! filters, places, permissions and writes it. No decoder touches the
//! filesystem directly.

use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use log::debug;
use log::trace;
use log::warn;

use crate::ExtractionOptions;
use crate::ExtractionReport;
use crate::Result;
use crate::filter::PathFilter;
use crate::filter::ResolvedTarget;
use crate::materialize;
use crate::permissions::PermissionResolver;
use crate::types::DestDir;
use crate::types::EntryKind;
use crate::types::EntryMetadata;

/// Per-extraction state shared by all entries of one archive.
#[derive(Debug)]
pub struct ExtractionEngine {
    dest: DestDir,
    filter: PathFilter,
    permissions: PermissionResolver,
    report: ExtractionReport,
    started: Instant,
}

impl ExtractionEngine {
    /// Prepares an extraction into `dest` with the given options.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob pattern is invalid or an owner/group
    /// override cannot be resolved.
    pub fn new(dest: DestDir, options: &ExtractionOptions) -> Result<Self> {
        Ok(Self {
            filter: PathFilter::new(&dest, options)?,
            permissions: PermissionResolver::new(options)?,
            dest,
            report: ExtractionReport::new(),
            started: Instant::now(),
        })
    }

    /// Processes one entry of any kind.
    ///
    /// `reader` is only consumed for regular files.
    ///
    /// # Errors
    ///
    /// See [`Self::file`] and [`Self::directory`].
    pub fn entry<R: Read + ?Sized>(
        &mut self,
        raw_path: &str,
        kind: EntryKind,
        meta: &EntryMetadata,
        reader: &mut R,
    ) -> Result<()> {
        match kind {
            EntryKind::File => self.file(raw_path, meta, reader),
            EntryKind::Directory => self.directory(raw_path, meta),
            EntryKind::Other => {
                self.unsupported(raw_path);
                Ok(())
            }
        }
    }

    /// Materializes a directory entry.
    ///
    /// # Errors
    ///
    /// Returns `Filesystem` if the directory cannot be created or its
    /// attributes cannot be applied.
    pub fn directory(&mut self, raw_path: &str, meta: &EntryMetadata) -> Result<()> {
        let Some(path) = self.target(raw_path)? else {
            return Ok(());
        };

        let attrs = self.permissions.directory(meta);
        let created = materialize::make_directory(&path, &attrs)?;
        trace!("directory {} (created: {created})", path.display());

        self.report.directories_created += 1;
        Ok(())
    }

    /// Materializes a regular file entry, streaming its payload from `reader`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedArchive` if the payload cannot be read and
    /// `Filesystem` if the destination cannot be written.
    pub fn file<R: Read + ?Sized>(
        &mut self,
        raw_path: &str,
        meta: &EntryMetadata,
        reader: &mut R,
    ) -> Result<()> {
        let Some(path) = self.target(raw_path)? else {
            return Ok(());
        };

        let parent = self.permissions.implicit_parent(meta);
        let written = materialize::write_file(&path, &parent, reader)?;
        materialize::finalize(&path, &self.permissions.file(meta))?;
        trace!("file {} ({written} bytes)", path.display());

        self.report.files_extracted += 1;
        self.report.bytes_written += written;
        Ok(())
    }

    /// Records an entry whose kind is never materialized.
    pub fn unsupported(&mut self, raw_path: &str) {
        debug!("skipping unsupported entry type: {raw_path}");
        self.report.unsupported_entries += 1;
    }

    /// Completes the extraction and returns its report.
    #[must_use]
    pub fn finish(mut self) -> ExtractionReport {
        self.report.duration = self.started.elapsed();
        self.report
    }

    fn target(&mut self, raw_path: &str) -> Result<Option<PathBuf>> {
        let path = match self.filter.resolve(raw_path) {
            ResolvedTarget::Skip => {
                debug!("skipping entry: {raw_path}");
                self.report.entries_skipped += 1;
                return Ok(None);
            }
            ResolvedTarget::Destination(path) => path,
        };

        if !self.dest.encloses(&path)? {
            warn!(
                "entry {raw_path} resolves outside {} through an existing link, skipping",
                self.dest.as_path().display()
            );
            self.report.entries_skipped += 1;
            return Ok(None);
        }

        Ok(Some(path))
    }
}
