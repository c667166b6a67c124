//! Archive entry classification and declared metadata.

/// Kind of an entry as declared by the archive.
///
/// Only files and directories are materialized. Everything else (symlinks,
/// hardlinks, devices, FIFOs) is reported as `Other` and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file with a byte payload.
    File,
    /// Directory.
    Directory,
    /// Any other entry type.
    Other,
}

/// Ownership and permission data carried by an archive entry.
///
/// Every field is optional because the formats differ: TAR headers carry
/// numeric ids, symbolic names and a mode, ZIP entries carry at most the
/// POSIX permission bits of their external attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Numeric owner id.
    pub uid: Option<u32>,
    /// Numeric group id.
    pub gid: Option<u32>,
    /// Symbolic owner name.
    pub user_name: Option<String>,
    /// Symbolic group name.
    pub group_name: Option<String>,
    /// Permission bits (`0o7777` mask applied).
    pub mode: Option<u32>,
}

impl EntryMetadata {
    /// Metadata with permission bits only.
    #[must_use]
    pub fn with_mode(mode: Option<u32>) -> Self {
        Self {
            mode: mode.map(|m| m & 0o7777),
            ..Self::default()
        }
    }
}
