//! Archive source resolution.
//!
//! A source descriptor is classified by its scheme prefix:
//!
//! | Descriptor                      | Kind      | Bytes come from                         |
//! |---------------------------------|-----------|-----------------------------------------|
//! | `http://`, `https://`, `ftp://` | `Remote`  | download cached at `<cache>/<basename>` |
//! | `file://<path>`                 | `Local`   | `<path>`                                |
//! | anything else                   | `Bundled` | `<bundle root>/files/default/<descr>`   |
//!
//! Every call to [`ArchiveSource::open`] returns a fresh stream positioned at
//! the first byte.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use log::info;

use crate::ExtractionError;
use crate::Result;

const REMOTE_SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];
const LOCAL_SCHEME: &str = "file://";

/// Where an archive's bytes are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Fetched over the network and cached locally.
    Remote(String),
    /// A path on the local filesystem.
    Local(PathBuf),
    /// A file shipped inside a named bundle.
    Bundled(PathBuf),
}

impl SourceKind {
    /// Classifies a descriptor by its scheme prefix.
    ///
    /// Bundled descriptors are returned relative; [`SourceResolver`] anchors
    /// them under the bundle root.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use unpack_core::source::SourceKind;
    ///
    /// assert_eq!(
    ///     SourceKind::classify("file:///tmp/a.tar"),
    ///     SourceKind::Local(PathBuf::from("/tmp/a.tar"))
    /// );
    /// assert!(matches!(SourceKind::classify("https://host/a.zip"), SourceKind::Remote(_)));
    /// assert!(matches!(SourceKind::classify("app.tgz"), SourceKind::Bundled(_)));
    /// ```
    #[must_use]
    pub fn classify(descriptor: &str) -> Self {
        if REMOTE_SCHEMES.iter().any(|s| descriptor.starts_with(s)) {
            Self::Remote(descriptor.to_string())
        } else if let Some(path) = descriptor.strip_prefix(LOCAL_SCHEME) {
            Self::Local(PathBuf::from(path))
        } else {
            Self::Bundled(PathBuf::from(descriptor))
        }
    }

    /// Short label used in log lines.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Remote(_) => "remote file",
            Self::Local(_) => "local file",
            Self::Bundled(_) => "bundled file",
        }
    }
}

/// A resolved, openable archive source.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    location: String,
    kind: SourceKind,
    cache_dir: PathBuf,
}

impl ArchiveSource {
    /// Source for a local archive path, bypassing descriptor classification.
    #[must_use]
    pub fn local(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            location: path.to_string_lossy().into_owned(),
            kind: SourceKind::Local(path),
            cache_dir: std::env::temp_dir(),
        }
    }

    /// The name the format is detected from: the URL, the `file://`
    /// descriptor, or the resolved bundle path.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// How the bytes are obtained.
    #[must_use]
    pub const fn kind(&self) -> &SourceKind {
        &self.kind
    }

    /// Opens a fresh read stream over the archive.
    ///
    /// Remote sources are downloaded into the cache directory first; an
    /// existing cached copy is overwritten.
    ///
    /// # Errors
    ///
    /// Returns `SourceUnavailable` if the file is missing or unreadable, or
    /// the download fails.
    pub fn open(&self) -> Result<File> {
        match &self.kind {
            SourceKind::Remote(url) => fetch(url, &self.cache_dir),
            SourceKind::Local(path) | SourceKind::Bundled(path) => File::open(path)
                .map_err(|e| ExtractionError::source_unavailable(&self.location, e)),
        }
    }
}

/// Resolves descriptors into [`ArchiveSource`]s.
///
/// Holds the download cache directory and the registry of named bundles.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    cache_dir: PathBuf,
    bundles: HashMap<String, PathBuf>,
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl SourceResolver {
    /// Creates a resolver caching downloads in `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            bundles: HashMap::new(),
        }
    }

    /// Registers a bundle whose files live under `root/files/default/`.
    #[must_use]
    pub fn with_bundle(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.bundles.insert(name.into(), root.into());
        self
    }

    /// Returns the download cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Resolves `descriptor`; `bundle` names the bundle used for
    /// descriptors without a scheme.
    ///
    /// # Errors
    ///
    /// Returns `SourceUnavailable` if a bundled descriptor is given without
    /// a bundle, or the bundle is not registered.
    pub fn resolve(&self, descriptor: &str, bundle: Option<&str>) -> Result<ArchiveSource> {
        let kind = match SourceKind::classify(descriptor) {
            SourceKind::Bundled(relative) => {
                let name = bundle.ok_or_else(|| {
                    ExtractionError::source_unavailable(descriptor, "no bundle given for a bundled source")
                })?;
                let root = self.bundles.get(name).ok_or_else(|| {
                    ExtractionError::source_unavailable(descriptor, format!("unknown bundle '{name}'"))
                })?;
                SourceKind::Bundled(root.join("files").join("default").join(relative))
            }
            other => other,
        };

        info!("Source is {}", kind.label());

        let location = match &kind {
            SourceKind::Bundled(path) => path.to_string_lossy().into_owned(),
            _ => descriptor.to_string(),
        };

        Ok(ArchiveSource {
            location,
            kind,
            cache_dir: self.cache_dir.clone(),
        })
    }
}

/// File name the download is cached under: the last path segment of the URL.
#[cfg_attr(not(feature = "remote"), allow(dead_code))]
fn cache_name(url: &str) -> Option<&str> {
    Path::new(url).file_name().and_then(|name| name.to_str())
}

#[cfg(feature = "remote")]
fn fetch(url: &str, cache_dir: &Path) -> Result<File> {
    use tempfile::NamedTempFile;

    if url.starts_with("ftp://") {
        return Err(ExtractionError::source_unavailable(
            url,
            "ftp downloads are not supported",
        ));
    }

    let name = cache_name(url)
        .ok_or_else(|| ExtractionError::source_unavailable(url, "URL has no file name"))?;
    let target = cache_dir.join(name);

    std::fs::create_dir_all(cache_dir)
        .map_err(|e| ExtractionError::source_unavailable(url, e))?;

    info!("Downloading {url} to {}", target.display());
    let mut response = reqwest::blocking::get(url)
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(|e| ExtractionError::source_unavailable(url, e))?;

    // Written under a temporary name so a failed download never leaves a
    // partial file at the cache path.
    let mut partial =
        NamedTempFile::new_in(cache_dir).map_err(|e| ExtractionError::source_unavailable(url, e))?;
    let bytes = response
        .copy_to(partial.as_file_mut())
        .map_err(|e| ExtractionError::source_unavailable(url, e))?;
    partial
        .persist(&target)
        .map_err(|e| ExtractionError::source_unavailable(url, e.error))?;
    log::debug!("downloaded {bytes} bytes from {url}");

    File::open(&target).map_err(|e| ExtractionError::source_unavailable(url, e))
}

#[cfg(not(feature = "remote"))]
fn fetch(url: &str, _cache_dir: &Path) -> Result<File> {
    Err(ExtractionError::source_unavailable(
        url,
        "built without remote source support",
    ))
}
