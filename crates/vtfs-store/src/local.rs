use std::collections::HashMap;

use parking_lot::RwLock;
use vtfs_types::{
    validate_name, DirEntry, FsError, FsResult, NodeKind, ObjectId, ObjectMeta, WriteOutcome,
};

use crate::config::LocalStoreConfig;
use crate::object::{DirectoryNode, FileNode, StorageObject};
use crate::traits::Backend;

/// Mode given to the root directory (`S_IFDIR | 0777`).
pub const ROOT_MODE: u32 = 0o040777;

/// In-memory tree store.
///
/// Objects live in an arena keyed by id; each directory owns its child
/// table. The whole tree sits behind one `RwLock`: lookups, iteration and
/// reads share it, every mutation takes it exclusively.
pub struct LocalTreeStore {
    config: LocalStoreConfig,
    state: RwLock<TreeState>,
}

/// Counters describing a store's contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub objects: usize,
    pub entries: usize,
    pub bytes: u64,
}

struct TreeState {
    objects: HashMap<ObjectId, StorageObject>,
    next_id: ObjectId,
}

impl TreeState {
    /// Nothing, not even a root. The state after shutdown.
    fn empty() -> Self {
        Self {
            objects: HashMap::new(),
            next_id: ObjectId::FIRST_ALLOCATED,
        }
    }

    fn with_root() -> Self {
        let mut state = Self::empty();
        state.objects.insert(
            ObjectId::ROOT,
            StorageObject::directory(ObjectId::ROOT, ObjectId::ROOT, ROOT_MODE),
        );
        state
    }

    fn object(&self, id: ObjectId) -> FsResult<&StorageObject> {
        self.objects
            .get(&id)
            .ok_or_else(|| FsError::NotFound(format!("object {id}")))
    }

    fn object_mut(&mut self, id: ObjectId) -> FsResult<&mut StorageObject> {
        self.objects
            .get_mut(&id)
            .ok_or_else(|| FsError::NotFound(format!("object {id}")))
    }

    fn directory(&self, id: ObjectId) -> FsResult<&DirectoryNode> {
        self.object(id)?
            .as_dir()
            .ok_or_else(|| FsError::NotADirectory(format!("object {id}")))
    }

    fn file(&self, id: ObjectId) -> FsResult<&FileNode> {
        self.object(id)?
            .as_file()
            .ok_or_else(|| FsError::IsADirectory(format!("object {id}")))
    }

    fn file_mut(&mut self, id: ObjectId) -> FsResult<&mut FileNode> {
        self.object_mut(id)?
            .as_file_mut()
            .ok_or_else(|| FsError::IsADirectory(format!("object {id}")))
    }

    /// Child id of `name` in `parent`, which must be a directory.
    fn child(&self, parent: ObjectId, name: &str) -> FsResult<ObjectId> {
        self.directory(parent)?
            .get(name)
            .ok_or_else(|| FsError::NotFound(format!("{name:?} in {parent}")))
    }

    /// Check that `name` can be bound in `parent`.
    fn check_vacant(&self, parent: ObjectId, name: &str) -> FsResult<()> {
        if self.directory(parent)?.get(name).is_some() {
            return Err(FsError::AlreadyExists(format!("{name:?} in {parent}")));
        }
        Ok(())
    }

    fn check_room(&self, config: &LocalStoreConfig) -> FsResult<()> {
        match config.max_objects {
            Some(max) if self.objects.len() >= max => Err(FsError::ResourceExhausted(format!(
                "object limit {max} reached"
            ))),
            _ => Ok(()),
        }
    }

    fn allocate_id(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// Insert `name -> id` into `parent`. Callers have already run
    /// `check_vacant`, so the parent exists and is a directory.
    fn bind(&mut self, parent: ObjectId, name: &str, id: ObjectId) -> FsResult<()> {
        let dir = self
            .object_mut(parent)?
            .as_dir_mut()
            .ok_or_else(|| FsError::NotADirectory(format!("object {parent}")))?;
        dir.children.insert(name.to_owned(), id);
        Ok(())
    }

    fn unbind(&mut self, parent: ObjectId, name: &str) {
        if let Some(dir) = self.objects.get_mut(&parent).and_then(|o| o.as_dir_mut()) {
            dir.children.shift_remove(name);
        }
    }

    fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            objects: self.objects.len(),
            ..StoreStats::default()
        };
        for object in self.objects.values() {
            if let Some(dir) = object.as_dir() {
                stats.entries += dir.len();
            }
            stats.bytes += object.size();
        }
        stats
    }
}

impl LocalTreeStore {
    /// Create an initialized store with default limits.
    pub fn new() -> Self {
        Self::with_config(LocalStoreConfig::default())
    }

    /// Create an initialized store with the given limits.
    pub fn with_config(config: LocalStoreConfig) -> Self {
        Self {
            config,
            state: RwLock::new(TreeState::with_root()),
        }
    }

    pub fn config(&self) -> &LocalStoreConfig {
        &self.config
    }

    pub fn stats(&self) -> StoreStats {
        self.state.read().stats()
    }

    fn make_node(
        &self,
        parent: ObjectId,
        name: &str,
        mode: u32,
        kind: NodeKind,
    ) -> FsResult<ObjectMeta> {
        validate_name(name)?;
        let mut state = self.state.write();
        state.check_vacant(parent, name)?;
        state.check_room(&self.config)?;

        let id = state.allocate_id();
        let object = match kind {
            NodeKind::Directory => StorageObject::directory(id, parent, mode),
            NodeKind::File => StorageObject::file(id, mode),
        };
        let meta = object.meta(parent);
        state.bind(parent, name, id)?;
        state.objects.insert(id, object);
        if kind.is_dir() {
            state.object_mut(parent)?.nlink += 1;
        }
        Ok(meta)
    }
}

impl Default for LocalTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for LocalTreeStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn initialize(&self) -> FsResult<()> {
        *self.state.write() = TreeState::with_root();
        tracing::info!(root = %ObjectId::ROOT, "local store initialized");
        Ok(())
    }

    fn shutdown(&self) {
        let released = {
            let mut state = self.state.write();
            let count = state.objects.len();
            *state = TreeState::empty();
            count
        };
        tracing::info!(released, "local store shut down");
    }

    fn get_root(&self) -> FsResult<ObjectMeta> {
        let state = self.state.read();
        Ok(state.object(ObjectId::ROOT)?.meta(ObjectId::ROOT))
    }

    fn lookup(&self, parent: ObjectId, name: &str) -> FsResult<ObjectMeta> {
        validate_name(name)?;
        let state = self.state.read();
        let id = state.child(parent, name)?;
        let meta = state.object(id)?.meta(parent);
        tracing::debug!(%parent, name, id = %meta.id, "lookup");
        Ok(meta)
    }

    fn iterate_dir(&self, dir: ObjectId, cursor: u64) -> FsResult<Option<DirEntry>> {
        let state = self.state.read();
        let node = state.directory(dir)?;
        let entry = match cursor {
            0 => Some(DirEntry::new(".", dir, NodeKind::Directory)),
            1 => Some(DirEntry::new("..", node.parent, NodeKind::Directory)),
            n => match usize::try_from(n - 2).ok().and_then(|i| node.child_at(i)) {
                Some((name, id)) => Some(DirEntry::new(name, id, state.object(id)?.kind())),
                None => None,
            },
        };
        tracing::trace!(%dir, cursor, end = entry.is_none(), "iterate");
        Ok(entry)
    }

    fn create_file(&self, parent: ObjectId, name: &str, mode: u32) -> FsResult<ObjectMeta> {
        let meta = self.make_node(parent, name, mode, NodeKind::File)?;
        tracing::debug!(%parent, name, mode, id = %meta.id, "create");
        Ok(meta)
    }

    fn make_dir(&self, parent: ObjectId, name: &str, mode: u32) -> FsResult<ObjectMeta> {
        let meta = self.make_node(parent, name, mode, NodeKind::Directory)?;
        tracing::debug!(%parent, name, mode, id = %meta.id, "mkdir");
        Ok(meta)
    }

    fn unlink(&self, parent: ObjectId, name: &str) -> FsResult<()> {
        validate_name(name)?;
        let mut state = self.state.write();
        let id = state.child(parent, name)?;
        if state.object(id)?.kind().is_dir() {
            return Err(FsError::IsADirectory(format!("{name:?} in {parent}")));
        }

        state.unbind(parent, name);
        let object = state.object_mut(id)?;
        object.nlink -= 1;
        let destroyed = object.nlink == 0;
        if destroyed {
            state.objects.remove(&id);
        }
        tracing::debug!(%parent, name, %id, destroyed, "unlink");
        Ok(())
    }

    fn remove_dir(&self, parent: ObjectId, name: &str) -> FsResult<()> {
        validate_name(name)?;
        let mut state = self.state.write();
        let id = state.child(parent, name)?;
        let dir = state
            .object(id)?
            .as_dir()
            .ok_or_else(|| FsError::NotADirectory(format!("{name:?} in {parent}")))?;
        if !dir.is_empty() {
            return Err(FsError::NotEmpty(format!(
                "{name:?} in {parent} has {} entries",
                dir.len()
            )));
        }

        state.unbind(parent, name);
        state.objects.remove(&id);
        let parent_obj = state.object_mut(parent)?;
        parent_obj.nlink = parent_obj.nlink.saturating_sub(1);
        tracing::debug!(%parent, name, %id, "rmdir");
        Ok(())
    }

    fn link(&self, parent: ObjectId, name: &str, target: ObjectId) -> FsResult<ObjectMeta> {
        validate_name(name)?;
        let mut state = self.state.write();
        state.check_vacant(parent, name)?;
        if state.object(target)?.kind().is_dir() {
            return Err(FsError::Unsupported(format!(
                "hard link to directory {target}"
            )));
        }

        state.bind(parent, name, target)?;
        let object = state.object_mut(target)?;
        object.nlink += 1;
        let meta = object.meta(parent);
        tracing::debug!(%parent, name, %target, nlink = meta.nlink, "link");
        Ok(meta)
    }

    fn read_file(&self, id: ObjectId, offset: u64, len: usize) -> FsResult<Vec<u8>> {
        let state = self.state.read();
        let data = state.file(id)?.read(offset, len);
        tracing::trace!(%id, offset, len, read = data.len(), "read");
        Ok(data)
    }

    fn write_file(&self, id: ObjectId, offset: u64, data: &[u8]) -> FsResult<WriteOutcome> {
        let mut state = self.state.write();
        let outcome = state
            .file_mut(id)?
            .write(offset, data, self.config.max_file_size)?;
        tracing::trace!(%id, offset, len = data.len(), new_size = outcome.new_size, "write");
        Ok(outcome)
    }

    fn truncate(&self, id: ObjectId, new_size: u64) -> FsResult<()> {
        let mut state = self.state.write();
        state
            .file_mut(id)?
            .truncate(new_size, self.config.max_file_size)?;
        tracing::debug!(%id, new_size, "truncate");
        Ok(())
    }
}

impl std::fmt::Debug for LocalTreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("LocalTreeStore")
            .field("object_count", &stats.objects)
            .field("entry_count", &stats.entries)
            .finish()
    }
}
