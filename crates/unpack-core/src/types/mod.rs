//! Value types shared by the extraction stages.
//!
//! - [`DestDir`]: canonical destination root with containment checks
//! - [`Principal`]: user or group given by id or name
//! - [`EntryKind`] and [`EntryMetadata`]: what a decoder reports per entry

pub mod dest_dir;
pub mod entry;
pub mod principal;

pub use dest_dir::DestDir;
pub use entry::EntryKind;
pub use entry::EntryMetadata;
pub use principal::Principal;
