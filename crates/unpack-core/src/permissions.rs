//! Ownership and mode resolution.
//!
//! Merges what an archive declares for an entry with the caller's
//! overrides. Overrides always win; archive values fill the gaps.

use std::collections::HashMap;

use crate::ExtractionOptions;
use crate::Result;
use crate::types::EntryMetadata;
use crate::types::principal::lookup_group;
use crate::types::principal::lookup_user;

/// Creation mode for directories the archive does not describe itself.
pub const IMPLICIT_DIR_MODE: u32 = 0o777;

/// Final attributes for a regular file, applied after its content is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileAttributes {
    /// Owner to apply, `None` to leave unchanged.
    pub uid: Option<u32>,
    /// Group to apply, `None` to leave unchanged.
    pub gid: Option<u32>,
    /// Mode to apply, `None` to leave the creation mode.
    pub mode: Option<u32>,
}

/// Attributes for a directory, applied as soon as it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryAttributes {
    /// Owner to apply, `None` to leave unchanged.
    pub uid: Option<u32>,
    /// Group to apply, `None` to leave unchanged.
    pub gid: Option<u32>,
    /// Mode used when the directory has to be created (umask applies).
    pub create_mode: u32,
    /// Caller override applied after creation, replacing `create_mode`.
    pub mode: Option<u32>,
}

/// Resolves per-entry attributes against one set of options.
#[derive(Debug)]
pub struct PermissionResolver {
    owner: Option<u32>,
    group: Option<u32>,
    file_mode: Option<u32>,
    dir_mode: Option<u32>,
    same_owner: bool,
    users: HashMap<String, Option<u32>>,
    groups: HashMap<String, Option<u32>>,
}

impl PermissionResolver {
    /// Builds a resolver, looking up named overrides once.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPrincipal` if the owner or group override names an
    /// account that does not exist on this host.
    pub fn new(options: &ExtractionOptions) -> Result<Self> {
        Ok(Self {
            owner: options.owner.as_ref().map(|p| p.resolve_user()).transpose()?,
            group: options.group.as_ref().map(|p| p.resolve_group()).transpose()?,
            file_mode: options.file_mode,
            dir_mode: options.dir_mode,
            same_owner: options.same_owner,
            users: HashMap::new(),
            groups: HashMap::new(),
        })
    }

    /// Attributes for an explicit directory entry.
    pub fn directory(&mut self, meta: &EntryMetadata) -> DirectoryAttributes {
        let create_mode = meta.mode.unwrap_or(IMPLICIT_DIR_MODE);
        self.directory_with_mode(meta, create_mode)
    }

    /// Attributes for a parent directory created on behalf of a file entry.
    ///
    /// Ownership follows the file entry; the creation mode is permissive.
    pub fn implicit_parent(&mut self, meta: &EntryMetadata) -> DirectoryAttributes {
        self.directory_with_mode(meta, IMPLICIT_DIR_MODE)
    }

    /// Attributes applied to a file once its content is written.
    pub fn file(&mut self, meta: &EntryMetadata) -> FileAttributes {
        FileAttributes {
            uid: self.owner_for(meta),
            gid: self.group_for(meta),
            mode: self.file_mode.or(meta.mode),
        }
    }

    fn directory_with_mode(&mut self, meta: &EntryMetadata, create_mode: u32) -> DirectoryAttributes {
        DirectoryAttributes {
            uid: self.owner_for(meta),
            gid: self.group_for(meta),
            create_mode,
            mode: self.dir_mode,
        }
    }

    fn owner_for(&mut self, meta: &EntryMetadata) -> Option<u32> {
        if self.owner.is_some() || !self.same_owner {
            return self.owner;
        }
        let named = meta.user_name.as_deref().and_then(|name| {
            *self
                .users
                .entry(name.to_string())
                .or_insert_with(|| lookup_user(name))
        });
        named.or(meta.uid)
    }

    fn group_for(&mut self, meta: &EntryMetadata) -> Option<u32> {
        if self.group.is_some() || !self.same_owner {
            return self.group;
        }
        let named = meta.group_name.as_deref().and_then(|name| {
            *self
                .groups
                .entry(name.to_string())
                .or_insert_with(|| lookup_group(name))
        });
        named.or(meta.gid)
    }
}
