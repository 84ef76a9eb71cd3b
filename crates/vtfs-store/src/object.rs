use indexmap::IndexMap;
use vtfs_types::{FsError, FsResult, NodeKind, ObjectId, ObjectMeta, WriteOutcome};

/// A storage object: metadata plus directory or file content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageObject {
    pub id: ObjectId,
    pub mode: u32,
    pub nlink: u32,
    pub content: Content,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    Directory(DirectoryNode),
    File(FileNode),
}

impl StorageObject {
    /// A new directory with the baseline link count of 2.
    pub fn directory(id: ObjectId, parent: ObjectId, mode: u32) -> Self {
        Self {
            id,
            mode,
            nlink: 2,
            content: Content::Directory(DirectoryNode::new(parent)),
        }
    }

    /// A new empty file with one link.
    pub fn file(id: ObjectId, mode: u32) -> Self {
        Self {
            id,
            mode,
            nlink: 1,
            content: Content::File(FileNode::default()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.content {
            Content::Directory(_) => NodeKind::Directory,
            Content::File(_) => NodeKind::File,
        }
    }

    pub fn size(&self) -> u64 {
        match &self.content {
            Content::Directory(_) => 0,
            Content::File(file) => file.size(),
        }
    }

    /// Metadata view, as reached through `parent`.
    pub fn meta(&self, parent: ObjectId) -> ObjectMeta {
        ObjectMeta {
            id: self.id,
            parent,
            kind: self.kind(),
            mode: self.mode,
            size: self.size(),
            nlink: self.nlink,
        }
    }

    pub fn as_dir(&self) -> Option<&DirectoryNode> {
        match &self.content {
            Content::Directory(dir) => Some(dir),
            Content::File(_) => None,
        }
    }

    pub fn as_dir_mut(&mut self) -> Option<&mut DirectoryNode> {
        match &mut self.content {
            Content::Directory(dir) => Some(dir),
            Content::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match &self.content {
            Content::File(file) => Some(file),
            Content::Directory(_) => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut FileNode> {
        match &mut self.content {
            Content::File(file) => Some(file),
            Content::Directory(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Directories
// ---------------------------------------------------------------------------

/// Directory content: the parent back-reference and the child table.
///
/// The child table is both the `(parent, name)` index and the iteration
/// order: entries enumerate in insertion order, and removal keeps the
/// relative order of the rest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryNode {
    pub parent: ObjectId,
    pub children: IndexMap<String, ObjectId>,
}

impl DirectoryNode {
    pub fn new(parent: ObjectId) -> Self {
        Self {
            parent,
            children: IndexMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.children.get(name).copied()
    }

    /// The `index`-th child in enumeration order.
    pub fn child_at(&self, index: usize) -> Option<(&str, ObjectId)> {
        self.children
            .get_index(index)
            .map(|(name, id)| (name.as_str(), *id))
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// File content: a zero-initialised buffer and a logical size.
///
/// `data.len()` is the buffer capacity. Every byte at or past `size` is
/// zero, so extending the file (by write or truncate) exposes zeros.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileNode {
    data: Vec<u8>,
    size: u64,
}

impl FileNode {
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Up to `len` bytes at `offset`; empty at or past end of file.
    pub fn read(&self, offset: u64, len: usize) -> Vec<u8> {
        if offset >= self.size {
            return Vec::new();
        }
        // offset < size <= data.len(), so both fit in usize
        let start = offset as usize;
        let available = (self.size - offset) as usize;
        let n = len.min(available);
        self.data[start..start + n].to_vec()
    }

    /// Copy `src` in at `offset`, growing the buffer and zero-filling any
    /// gap between the old size and `offset`. Size only grows.
    pub fn write(&mut self, offset: u64, src: &[u8], max_size: u64) -> FsResult<WriteOutcome> {
        if src.is_empty() {
            return Ok(WriteOutcome {
                bytes_written: 0,
                new_size: self.size,
            });
        }
        let end = offset.checked_add(src.len() as u64).ok_or_else(|| {
            FsError::InvalidArgument(format!("write end overflows: {offset} + {}", src.len()))
        })?;
        if end > max_size {
            return Err(FsError::ResourceExhausted(format!(
                "write to {end} exceeds file size limit {max_size}"
            )));
        }
        let start = to_index(offset)?;
        let end_idx = to_index(end)?;
        if end_idx > self.data.len() {
            self.grow(end_idx)?;
        }
        let size_idx = self.size as usize;
        if start > size_idx {
            self.data[size_idx..start].fill(0);
        }
        self.data[start..end_idx].copy_from_slice(src);
        self.size = self.size.max(end);
        Ok(WriteOutcome {
            bytes_written: src.len() as u64,
            new_size: self.size,
        })
    }

    /// Set the logical size. Shrinking zeroes the cut region; growing
    /// exposes zeros. Capacity never shrinks.
    pub fn truncate(&mut self, new_size: u64, max_size: u64) -> FsResult<()> {
        if new_size > max_size {
            return Err(FsError::ResourceExhausted(format!(
                "truncate to {new_size} exceeds file size limit {max_size}"
            )));
        }
        let new_idx = to_index(new_size)?;
        if new_idx > self.data.len() {
            self.grow(new_idx)?;
        }
        if new_size < self.size {
            let old_idx = self.size as usize;
            self.data[new_idx..old_idx].fill(0);
        }
        self.size = new_size;
        Ok(())
    }

    /// Grow the buffer to `max(2 * capacity, needed)`, zero-filled.
    fn grow(&mut self, needed: usize) -> FsResult<()> {
        let old = self.data.len();
        let new_cap = old.saturating_mul(2).max(needed);
        self.data.try_reserve_exact(new_cap - old).map_err(|e| {
            FsError::ResourceExhausted(format!("cannot grow buffer to {new_cap} bytes: {e}"))
        })?;
        self.data.resize(new_cap, 0);
        Ok(())
    }
}

fn to_index(value: u64) -> FsResult<usize> {
    usize::try_from(value)
        .map_err(|_| FsError::ResourceExhausted(format!("offset {value} not addressable")))
}
