//! Validated destination directory type.

use crate::ExtractionError;
use crate::Result;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// The validated root directory an archive is extracted into.
///
/// The root is created if it does not exist yet and is held in canonical
/// form, so every containment check compares against a symlink-free prefix.
///
/// # Examples
///
/// ```no_run
/// use unpack_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/srv/app")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates (if needed) and canonicalizes the destination root.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - The path exists but is not a directory
    /// - The path cannot be canonicalized
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        match std::fs::metadata(&path) {
            Ok(meta) if !meta.is_dir() => {
                return Err(ExtractionError::InvalidDestination { path });
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                std::fs::create_dir_all(&path)
                    .map_err(|e| ExtractionError::filesystem(&path, e))?;
            }
            Err(e) => return Err(ExtractionError::filesystem(&path, e)),
        }

        let canonical = path
            .canonicalize()
            .map_err(|e| ExtractionError::filesystem(&path, e))?;

        Ok(Self(canonical))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Checks that writing at `path` cannot land outside the root.
    ///
    /// The nearest existing ancestor of `path`'s parent is canonicalized, so
    /// a symlink already sitting in the destination tree and pointing
    /// elsewhere is detected. The final component is not followed: the
    /// materializer replaces whatever non-matching object sits there. A
    /// dangling symlink is skipped over for the same reason.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing ancestor cannot be canonicalized.
    pub fn encloses(&self, path: &Path) -> Result<bool> {
        if !path.starts_with(&self.0) {
            return Ok(false);
        }

        let mut ancestor = path.parent();
        while let Some(candidate) = ancestor {
            match std::fs::symlink_metadata(candidate) {
                Ok(meta) => match candidate.canonicalize() {
                    Ok(canonical) => return Ok(canonical.starts_with(&self.0)),
                    Err(_) if meta.file_type().is_symlink() => {
                        ancestor = candidate.parent();
                    }
                    Err(e) => return Err(ExtractionError::filesystem(candidate, e)),
                },
                Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
                    ancestor = candidate.parent();
                }
                Err(e) => return Err(ExtractionError::filesystem(candidate, e)),
            }
        }

        Ok(false)
    }
}
