#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! The object cache and the build pass that compiles it into a routing
//! graph with per-document statuses.

use std::fmt;

pub mod annotations;
pub mod builder;
pub mod cache;
#[cfg(test)]
mod fixtures;
pub mod status;

pub use self::builder::build;
pub use self::cache::{Cache, Index, Kind, Object, SharedIndex, Snapshot, Trigger};
pub use self::status::{DocKind, Status, StatusMap, STATUS_INVALID, STATUS_ORPHANED, STATUS_VALID};

/// Identity of an object within its kind.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Meta {
    pub namespace: String,
    pub name: String,
}

impl Meta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Meta {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
