//! Caller-supplied extraction policy.

use crate::types::Principal;

/// Options controlling how entries are filtered, placed and permissioned.
///
/// The value is immutable for the duration of one extraction and is passed
/// by reference into every stage. Nothing in the engine mutates it per entry.
///
/// # Examples
///
/// ```
/// use unpack_core::ExtractionOptions;
/// use unpack_core::types::Principal;
///
/// let options = ExtractionOptions::default()
///     .with_strip_components(1)
///     .with_owner(Some(Principal::Name("www-data".into())))
///     .with_file_mode(Some(0o640))
///     .with_excludes(vec!["*.log".into()])
///     .with_includes(vec!["important.log".into()]);
///
/// assert_eq!(options.strip_components, 1);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    /// Mode applied to every extracted file after its content is written.
    ///
    /// Takes precedence over the archive-declared permissions.
    ///
    /// Default: `None` (keep archive permissions).
    pub file_mode: Option<u32>,

    /// Mode applied to every directory the extraction creates or touches.
    ///
    /// Default: `None`.
    pub dir_mode: Option<u32>,

    /// Owner for every materialized path, overriding the archive.
    ///
    /// Default: `None`.
    pub owner: Option<Principal>,

    /// Group for every materialized path, overriding the archive.
    ///
    /// Default: `None`.
    pub group: Option<Principal>,

    /// Glob patterns that re-include entries matched by an exclusion.
    ///
    /// Default: empty.
    pub includes: Vec<String>,

    /// Glob patterns for entries to leave out.
    ///
    /// Default: empty.
    pub excludes: Vec<String>,

    /// Number of leading path segments dropped from every entry.
    ///
    /// Default: `0`.
    pub strip_components: usize,

    /// Apply the owner and group recorded in the archive.
    ///
    /// When `false` only the `owner`/`group` overrides are applied. Useful
    /// when extracting as an unprivileged user.
    ///
    /// Default: `true`.
    pub same_owner: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            file_mode: None,
            dir_mode: None,
            owner: None,
            group: None,
            includes: Vec::new(),
            excludes: Vec::new(),
            strip_components: 0,
            same_owner: true,
        }
    }
}

impl ExtractionOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the file mode override.
    #[must_use]
    pub fn with_file_mode(mut self, mode: Option<u32>) -> Self {
        self.file_mode = mode;
        self
    }

    /// Sets the directory mode override.
    #[must_use]
    pub fn with_dir_mode(mut self, mode: Option<u32>) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Sets the owner override.
    #[must_use]
    pub fn with_owner(mut self, owner: Option<Principal>) -> Self {
        self.owner = owner;
        self
    }

    /// Sets the group override.
    #[must_use]
    pub fn with_group(mut self, group: Option<Principal>) -> Self {
        self.group = group;
        self
    }

    /// Sets the inclusion patterns.
    #[must_use]
    pub fn with_includes(mut self, patterns: Vec<String>) -> Self {
        self.includes = patterns;
        self
    }

    /// Sets the exclusion patterns.
    #[must_use]
    pub fn with_excludes(mut self, patterns: Vec<String>) -> Self {
        self.excludes = patterns;
        self
    }

    /// Sets how many leading path segments to strip.
    #[must_use]
    pub fn with_strip_components(mut self, count: usize) -> Self {
        self.strip_components = count;
        self
    }

    /// Sets whether archive-declared ownership is applied.
    #[must_use]
    pub fn with_same_owner(mut self, same_owner: bool) -> Self {
        self.same_owner = same_owner;
        self
    }
}
