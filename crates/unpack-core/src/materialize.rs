//! Filesystem materialization shared by the TAR and ZIP decoders.
//!
//! All operations overwrite whatever currently sits at the destination
//! path. Nothing is backed up and nothing is rolled back.
//!
//! # Functions
//!
//! - [`make_directory`]: create (or reuse) a directory, then apply attributes
//! - [`write_file`]: replace a file's content, creating its parent if needed
//! - [`finalize`]: apply mode and ownership once content is on disk

use std::fs;
use std::fs::DirBuilder;
use std::fs::File;
use std::fs::Permissions;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::os::unix::fs::DirBuilderExt;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::ExtractionError;
use crate::Result;
use crate::permissions::DirectoryAttributes;
use crate::permissions::FileAttributes;

/// Buffer size for streaming entry payloads to disk (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Creates a directory at `path` and applies its attributes.
///
/// A non-directory object already at `path` (file, symlink, device) is
/// removed first; the check does not follow symlinks. The same applies to
/// the nearest existing ancestor when it is not a directory. Missing parents
/// are created with the same creation mode. An explicit mode override replaces
/// the creation mode afterwards, then ownership is applied.
///
/// Returns `true` if the directory did not exist before.
///
/// # Errors
///
/// Returns `Filesystem` if removal, creation, chmod or chown fails.
pub fn make_directory(path: &Path, attrs: &DirectoryAttributes) -> Result<bool> {
    let created = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => false,
        Ok(_) => {
            remove_existing(path)?;
            create_dir_tree(path, attrs.create_mode)?;
            true
        }
        Err(e) if is_missing(&e) => {
            clear_blocking_ancestor(path)?;
            create_dir_tree(path, attrs.create_mode)?;
            true
        }
        Err(e) => return Err(ExtractionError::filesystem(path, e)),
    };

    if let Some(mode) = attrs.mode {
        set_mode(path, mode)?;
    }
    set_owner(path, attrs.uid, attrs.gid)?;

    Ok(created)
}

/// Writes the full payload of `reader` to `path`.
///
/// Anything at `path` that is not a regular file is removed first
/// (directories recursively). If the parent directory is missing it is
/// created through [`make_directory`] with `parent` attributes. Existing
/// regular files are truncated.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns `MalformedArchive` if the payload cannot be read to the end and
/// `Filesystem` if the destination cannot be written.
pub fn write_file<R: Read + ?Sized>(
    path: &Path,
    parent: &DirectoryAttributes,
    reader: &mut R,
) -> Result<u64> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => remove_existing(path)?,
        Err(e) if is_missing(&e) => {}
        Err(e) => return Err(ExtractionError::filesystem(path, e)),
    }

    if let Some(dir) = path.parent()
        && !fs::symlink_metadata(dir).is_ok_and(|meta| meta.is_dir())
    {
        make_directory(dir, parent)?;
    }

    let file = File::create(path).map_err(|e| ExtractionError::filesystem(path, e))?;
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, file);
    let written = copy_payload(reader, &mut writer, path)?;
    writer
        .flush()
        .map_err(|e| ExtractionError::filesystem(path, e))?;

    Ok(written)
}

/// Applies mode then ownership to a written file.
///
/// # Errors
///
/// Returns `Filesystem` if chmod or chown fails.
pub fn finalize(path: &Path, attrs: &FileAttributes) -> Result<()> {
    if let Some(mode) = attrs.mode {
        set_mode(path, mode)?;
    }
    set_owner(path, attrs.uid, attrs.gid)
}

fn create_dir_tree(path: &Path, mode: u32) -> Result<()> {
    DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(path)
        .map_err(|e| ExtractionError::filesystem(path, e))
}

/// `NotADirectory` means some ancestor is a file; it gets replaced like a
/// missing path.
fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Removes the nearest existing ancestor of `path` if it is not a directory.
fn clear_blocking_ancestor(path: &Path) -> Result<()> {
    for ancestor in path.ancestors().skip(1) {
        match fs::symlink_metadata(ancestor) {
            Ok(meta) if meta.is_dir() => return Ok(()),
            Ok(_) => return remove_existing(ancestor),
            Err(_) => {}
        }
    }
    Ok(())
}

fn remove_existing(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| ExtractionError::filesystem(path, e))?;
    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|e| ExtractionError::filesystem(path, e))
}

fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, Permissions::from_mode(mode))
        .map_err(|e| ExtractionError::filesystem(path, e))
}

fn set_owner(path: &Path, uid: Option<u32>, gid: Option<u32>) -> Result<()> {
    if uid.is_none() && gid.is_none() {
        return Ok(());
    }
    std::os::unix::fs::chown(path, uid, gid).map_err(|e| ExtractionError::filesystem(path, e))
}

/// Copies the payload, keeping read failures (archive) apart from write
/// failures (destination).
fn copy_payload<R: Read + ?Sized, W: Write>(
    reader: &mut R,
    writer: &mut W,
    path: &Path,
) -> Result<u64> {
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ExtractionError::malformed(
                    format!("reading payload for {}", path.display()),
                    e,
                ));
            }
        };
        writer
            .write_all(&buf[..n])
            .map_err(|e| ExtractionError::filesystem(path, e))?;
        total += n as u64;
    }
}
