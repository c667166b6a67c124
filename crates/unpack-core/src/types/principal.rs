//! User and group identifiers for ownership policy.

use std::fmt;
use std::str::FromStr;

use nix::unistd::Group;
use nix::unistd::User;

use crate::ExtractionError;
use crate::Result;

/// A user or group, given either by numeric id or by name.
///
/// Names are resolved against the host's user and group databases at the
/// time ownership is applied.
///
/// # Examples
///
/// ```
/// use unpack_core::types::Principal;
///
/// assert_eq!("0".parse::<Principal>(), Ok(Principal::Id(0)));
/// assert_eq!(
///     "deploy".parse::<Principal>(),
///     Ok(Principal::Name("deploy".into()))
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// Numeric uid or gid.
    Id(u32),
    /// Symbolic user or group name.
    Name(String),
}

impl Principal {
    /// Resolves this principal to a numeric uid.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPrincipal` if the name has no entry in the user
    /// database.
    pub fn resolve_user(&self) -> Result<u32> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Name(name) => lookup_user(name).ok_or_else(|| ExtractionError::UnknownPrincipal {
                kind: "user",
                name: name.clone(),
            }),
        }
    }

    /// Resolves this principal to a numeric gid.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPrincipal` if the name has no entry in the group
    /// database.
    pub fn resolve_group(&self) -> Result<u32> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Name(name) => {
                lookup_group(name).ok_or_else(|| ExtractionError::UnknownPrincipal {
                    kind: "group",
                    name: name.clone(),
                })
            }
        }
    }
}

impl FromStr for Principal {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty user or group".to_string());
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u32>()
                .map(Self::Id)
                .map_err(|_| format!("id out of range: {s}"));
        }
        Ok(Self::Name(s.to_string()))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Looks up a uid by user name. Lookup failures count as "not found".
pub(crate) fn lookup_user(name: &str) -> Option<u32> {
    User::from_name(name)
        .ok()
        .flatten()
        .map(|user| user.uid.as_raw())
}

/// Looks up a gid by group name. Lookup failures count as "not found".
pub(crate) fn lookup_group(name: &str) -> Option<u32> {
    Group::from_name(name)
        .ok()
        .flatten()
        .map(|group| group.gid.as_raw())
}
