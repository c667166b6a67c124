//! High-level public API for archive extraction.

use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

use flate2::read::GzDecoder;
use log::debug;
use log::info;

use crate::ExtractionOptions;
use crate::ExtractionReport;
use crate::Result;
use crate::extraction::ExtractionEngine;
use crate::formats::ArchiveFormat;
use crate::formats::FormatKind;
use crate::formats::TarArchive;
use crate::formats::ZipArchive;
use crate::formats::detect_format;
use crate::source::ArchiveSource;
use crate::source::SourceResolver;
use crate::types::DestDir;

/// Extracts a resolved source into `dest_root`.
///
/// The format is chosen from the source location's suffix before the source
/// is opened, so an unsupported name never triggers a download. The
/// destination root is only created once the source has opened.
///
/// # Errors
///
/// Returns an error if:
/// - The location has no supported suffix (`UnsupportedFormat`)
/// - The source cannot be opened or fetched (`SourceUnavailable`)
/// - The archive is corrupt or truncated (`MalformedArchive`)
/// - The destination cannot be written (`Filesystem`)
///
/// Entries materialized before a failure stay on disk.
///
/// # Examples
///
/// ```no_run
/// use unpack_core::ExtractionOptions;
/// use unpack_core::extract;
/// use unpack_core::source::ArchiveSource;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = ArchiveSource::local("/var/cache/app-1.0.tar.gz");
/// let options = ExtractionOptions::default().with_strip_components(1);
/// let report = extract(&source, "/opt/app", &options)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract(
    source: &ArchiveSource,
    dest_root: impl AsRef<Path>,
    options: &ExtractionOptions,
) -> Result<ExtractionReport> {
    let format = detect_format(source.location())?;
    let stream = source.open()?;

    let engine = ExtractionEngine::new(DestDir::new(dest_root.as_ref())?, options)?;
    info!("Creating {format} decoder for {}", source.location());
    run(BufReader::new(stream), format, engine)
}

/// Extracts an archive file on the local filesystem.
///
/// Shorthand for [`extract`] with [`ArchiveSource::local`].
///
/// # Errors
///
/// See [`extract`].
pub fn extract_archive(
    archive_path: impl AsRef<Path>,
    dest_root: impl AsRef<Path>,
    options: &ExtractionOptions,
) -> Result<ExtractionReport> {
    extract(&ArchiveSource::local(archive_path.as_ref()), dest_root, options)
}

/// Extracts an already-open stream of a known format.
///
/// # Errors
///
/// See [`extract`]; `UnsupportedFormat` and `SourceUnavailable` cannot
/// occur.
pub fn extract_reader<R: Read + Seek>(
    reader: R,
    format: FormatKind,
    dest_root: impl AsRef<Path>,
    options: &ExtractionOptions,
) -> Result<ExtractionReport> {
    let engine = ExtractionEngine::new(DestDir::new(dest_root.as_ref())?, options)?;
    info!("Creating {format} decoder for in-memory stream");
    run(reader, format, engine)
}

/// Resolves `descriptor` and extracts it in one call.
///
/// `bundle` names the bundle used when the descriptor has no scheme.
///
/// # Errors
///
/// See [`SourceResolver::resolve`] and [`extract`].
pub fn unpack(
    descriptor: &str,
    bundle: Option<&str>,
    resolver: &SourceResolver,
    dest_root: impl AsRef<Path>,
    options: &ExtractionOptions,
) -> Result<ExtractionReport> {
    let source = resolver.resolve(descriptor, bundle)?;
    extract(&source, dest_root, options)
}

fn run<R: Read + Seek>(
    reader: R,
    format: FormatKind,
    mut engine: ExtractionEngine,
) -> Result<ExtractionReport> {
    match format {
        FormatKind::TarGz => decode(TarArchive::new(GzDecoder::new(reader)), &mut engine)?,
        FormatKind::Tar => decode(TarArchive::new(reader), &mut engine)?,
        FormatKind::Zip => decode(ZipArchive::new(reader)?, &mut engine)?,
    }

    let report = engine.finish();
    info!(
        "Extracted {} entries ({} files, {} directories, {} bytes) in {:?}; {} ignored",
        report.total_items(),
        report.files_extracted,
        report.directories_created,
        report.bytes_written,
        report.duration,
        report.total_ignored()
    );
    Ok(report)
}

fn decode<A: ArchiveFormat>(mut archive: A, engine: &mut ExtractionEngine) -> Result<()> {
    debug!("walking {} entries", archive.format_name());
    archive.extract(engine)
}
