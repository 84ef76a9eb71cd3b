use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a storage object.
///
/// Ids are allocated monotonically by the store and are never reused while
/// the object or any entry naming it is reachable. `0` is never a valid id:
/// it is what an empty reply record decodes to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    /// The root directory. Created at initialization, never destroyed.
    pub const ROOT: ObjectId = ObjectId(1);

    /// The null id (no object).
    pub const NULL: ObjectId = ObjectId(0);

    /// First id handed out after the root.
    pub const FIRST_ALLOCATED: ObjectId = ObjectId(2);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    /// The id following this one in allocation order.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<ObjectId> for u64 {
    fn from(id: ObjectId) -> u64 {
        id.0
    }
}

/// The kind of a storage object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Directory,
    File,
}

impl NodeKind {
    /// Wire tag. `0` is deliberately unassigned.
    pub fn tag(self) -> u32 {
        match self {
            Self::Directory => 1,
            Self::File => 2,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::Directory),
            2 => Some(Self::File),
            _ => None,
        }
    }

    pub fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }

    pub fn is_file(self) -> bool {
        matches!(self, Self::File)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "dir"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Metadata view of a storage object, as returned by every operation that
/// produces an object.
///
/// `parent` is the directory through which the object was reached. For a
/// hard-linked file this depends on which entry was used; the root is its
/// own parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub id: ObjectId,
    pub parent: ObjectId,
    pub kind: NodeKind,
    /// Permission bits, stored and returned unchanged.
    pub mode: u32,
    /// Logical length in bytes. Always 0 for directories.
    pub size: u64,
    /// Number of directory entries referencing a file, or
    /// `2 + subdirectories` for a directory.
    pub nlink: u32,
}

impl ObjectMeta {
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }
}

/// A single directory iteration result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub id: ObjectId,
    pub kind: NodeKind,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, id: ObjectId, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            id,
            kind,
        }
    }

    /// True for the synthetic "." and ".." entries.
    pub fn is_dot(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

/// Result of a successful write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    pub bytes_written: u64,
    pub new_size: u64,
}
