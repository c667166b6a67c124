//! Entry path filtering: component stripping, glob rules and containment.
//!
//! Every raw entry name goes through [`PathFilter::resolve`] before anything
//! touches the filesystem. The filter is purely lexical; it never consults
//! the destination tree.

use std::path::PathBuf;

use glob::MatchOptions;
use glob::Pattern;

use crate::ExtractionError;
use crate::ExtractionOptions;
use crate::Result;
use crate::types::DestDir;

/// `*` and `?` stop at `/`; leading dots are ordinary characters.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Outcome of filtering one entry path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// The entry is not materialized.
    Skip,
    /// Absolute destination, always beneath the destination root.
    Destination(PathBuf),
}

impl ResolvedTarget {
    /// Returns the destination path, if any.
    #[must_use]
    pub fn destination(&self) -> Option<&PathBuf> {
        match self {
            Self::Skip => None,
            Self::Destination(path) => Some(path),
        }
    }
}

/// Maps raw archive entry names to destination paths.
///
/// # Examples
///
/// ```no_run
/// use unpack_core::ExtractionOptions;
/// use unpack_core::filter::PathFilter;
/// use unpack_core::filter::ResolvedTarget;
/// use unpack_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/dst")?;
/// let options = ExtractionOptions::default().with_strip_components(1);
/// let filter = PathFilter::new(&dest, &options)?;
///
/// assert_eq!(
///     filter.resolve("a/b/c.txt"),
///     ResolvedTarget::Destination(dest.as_path().join("b/c.txt"))
/// );
/// assert_eq!(filter.resolve("a"), ResolvedTarget::Skip);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    strip_components: usize,
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl PathFilter {
    /// Compiles the option patterns for one extraction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for the first pattern that is not a valid
    /// glob.
    pub fn new(dest: &DestDir, options: &ExtractionOptions) -> Result<Self> {
        Ok(Self {
            root: dest.as_path().to_path_buf(),
            strip_components: options.strip_components,
            includes: compile(&options.includes)?,
            excludes: compile(&options.excludes)?,
        })
    }

    /// Resolves a raw, untrusted entry name.
    #[must_use]
    pub fn resolve(&self, raw_path: &str) -> ResolvedTarget {
        let mut segments: Vec<&str> = raw_path.split('/').collect();
        while segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        if segments.first().is_some_and(|s| s.is_empty()) {
            segments.remove(0);
        }

        if segments.len() <= self.strip_components {
            return ResolvedTarget::Skip;
        }

        let relative = segments[self.strip_components..].join("/");
        if !self.is_included(&relative) {
            return ResolvedTarget::Skip;
        }

        match normalize(&relative) {
            Some(normalized) => ResolvedTarget::Destination(self.root.join(normalized)),
            None => ResolvedTarget::Skip,
        }
    }

    /// Applies the exclusion and inclusion rules to a post-strip path.
    ///
    /// An entry is left out only if it matches an exclusion and no
    /// inclusion. With no patterns everything is included.
    #[must_use]
    pub fn is_included(&self, relative: &str) -> bool {
        !matches_any(&self.excludes, relative) || matches_any(&self.includes, relative)
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| ExtractionError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn matches_any(patterns: &[Pattern], path: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| pattern.matches_with(path, MATCH_OPTIONS))
}

/// Lexically normalizes a relative path.
///
/// Returns `None` when a `..` climbs above the start or when nothing is left
/// (the entry would be the root itself).
fn normalize(relative: &str) -> Option<PathBuf> {
    let mut kept: Vec<&str> = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                kept.pop()?;
            }
            other => kept.push(other),
        }
    }

    if kept.is_empty() {
        return None;
    }
    Some(kept.iter().collect())
}
