use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::BlockId;

/// What a directory entry points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    File,
    Directory,
    Symlink,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Symlink => write!(f, "symlink"),
        }
    }
}

/// One entry of a listed directory.
///
/// Produced from shard nodes alone: `target` names the entry's content but
/// is never fetched during listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub target: BlockId,
    pub entry_type: EntryType,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, target: BlockId, entry_type: EntryType) -> Self {
        Self {
            name: name.into(),
            target,
            entry_type,
        }
    }
}
