//! Shared helpers for building archives on disk.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::fs;
use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;
use zip::write::SimpleFileOptions;

/// Uid/gid of the test process, so archive ownership can be applied
/// without privileges.
pub fn current_ids() -> (u32, u32) {
    (
        nix::unistd::getuid().as_raw(),
        nix::unistd::getgid().as_raw(),
    )
}

/// Builds TAR archives entry by entry.
pub struct TarBuilder {
    inner: tar::Builder<Vec<u8>>,
}

impl TarBuilder {
    pub fn new() -> Self {
        Self {
            inner: tar::Builder::new(Vec::new()),
        }
    }

    fn header(kind: tar::EntryType, size: u64, mode: u32) -> tar::Header {
        let (uid, gid) = current_ids();
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(kind);
        header.set_size(size);
        header.set_mode(mode);
        header.set_uid(u64::from(uid));
        header.set_gid(u64::from(gid));
        header
    }

    pub fn dir(mut self, path: &str, mode: u32) -> Self {
        let mut header = Self::header(tar::EntryType::Directory, 0, mode);
        self.inner
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    pub fn file(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len() as u64, mode);
        self.inner.append_data(&mut header, path, data).unwrap();
        self
    }

    pub fn symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Symlink, 0, 0o777);
        header.set_link_name(target).unwrap();
        self.inner
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// A `././@LongLink` record whose payload names the next entry.
    pub fn long_link(mut self, name: &str) -> Self {
        let payload = format!("{name}\0");
        let mut header = Self::header(tar::EntryType::GNULongName, payload.len() as u64, 0o644);
        let raw = b"././@LongLink";
        header.as_old_mut().name[..raw.len()].copy_from_slice(raw);
        header.set_cksum();
        self.inner.append(&header, payload.as_bytes()).unwrap();
        self
    }

    /// A file whose raw header name is written verbatim, bypassing the
    /// builder's path normalization (used for `..` entries).
    pub fn raw_file(mut self, raw_name: &str, data: &[u8]) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len() as u64, 0o644);
        header.as_old_mut().name[..raw_name.len()].copy_from_slice(raw_name.as_bytes());
        header.set_cksum();
        self.inner.append(&header, data).unwrap();
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.inner.into_inner().unwrap()
    }
}

/// Builds ZIP archives entry by entry.
pub struct ZipBuilder {
    inner: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            inner: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    pub fn dir(mut self, path: &str, mode: u32) -> Self {
        let options = SimpleFileOptions::default().unix_permissions(mode);
        self.inner.add_directory(path, options).unwrap();
        self
    }

    pub fn file(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(mode);
        self.inner.start_file(path, options).unwrap();
        self.inner.write_all(data).unwrap();
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.inner.finish().unwrap().into_inner()
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Writes `bytes` as `dir/name` and returns the path.
pub fn write_archive(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Sorted list of every path under `root`, relative, directories suffixed
/// with `/`.
pub fn tree(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let relative = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
            if fs::symlink_metadata(&path).unwrap().is_dir() {
                out.push(format!("{relative}/"));
                walk(root, &path, out);
            } else {
                out.push(relative);
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

/// Every path under `root` with its mode, uid and gid, in `tree` order.
pub fn attributes(root: &Path) -> Vec<(String, u32, u32, u32)> {
    use std::os::unix::fs::MetadataExt;

    tree(root)
        .into_iter()
        .map(|relative| {
            let meta = fs::symlink_metadata(root.join(relative.trim_end_matches('/'))).unwrap();
            (relative, meta.mode() & 0o7777, meta.uid(), meta.gid())
        })
        .collect()
}

pub fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o7777
}
