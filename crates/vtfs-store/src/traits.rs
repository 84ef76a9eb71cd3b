use vtfs_types::{
    Capabilities, DirEntry, FsError, FsResult, ObjectId, ObjectMeta, WriteOutcome,
};

/// The operation set every vtfs backend satisfies.
///
/// All implementations must satisfy these invariants:
/// - Results and error kinds are identical across backends for the same
///   sequence of calls.
/// - A failed call leaves the store unchanged.
/// - Names are validated with [`vtfs_types::validate_name`] before anything
///   else happens.
/// - Calls are synchronous: they run on the caller's thread and block for
///   as long as the backend needs (a network round trip for remote stores).
pub trait Backend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Operations this backend implements. Everything else answers
    /// `Unsupported`.
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    /// Reset the store and (re)create the root directory.
    fn initialize(&self) -> FsResult<()>;

    /// Release all state.
    fn shutdown(&self);

    /// Metadata of the root directory.
    fn get_root(&self) -> FsResult<ObjectMeta>;

    /// Resolve `name` inside directory `parent`.
    fn lookup(&self, parent: ObjectId, name: &str) -> FsResult<ObjectMeta>;

    /// Entry at position `cursor` of directory `dir`.
    ///
    /// Position 0 is ".", position 1 is "..", then real children in a
    /// stable order. Returns `Ok(None)` once `cursor` is past the end. The
    /// cursor carries no state beyond its value; results are undefined if
    /// the same directory is mutated between calls.
    fn iterate_dir(&self, dir: ObjectId, cursor: u64) -> FsResult<Option<DirEntry>>;

    /// Create an empty file named `name` in `parent`.
    fn create_file(&self, parent: ObjectId, name: &str, mode: u32) -> FsResult<ObjectMeta>;

    /// Create an empty directory named `name` in `parent`.
    fn make_dir(&self, parent: ObjectId, name: &str, mode: u32) -> FsResult<ObjectMeta>;

    /// Remove the entry `name` from `parent`. The entry must reference a
    /// file; the file is destroyed with its last entry.
    fn unlink(&self, parent: ObjectId, name: &str) -> FsResult<()>;

    /// Remove the empty directory `name` from `parent`.
    fn remove_dir(&self, parent: ObjectId, name: &str) -> FsResult<()>;

    /// Bind `name` in `parent` to the existing file `target`.
    fn link(&self, parent: ObjectId, name: &str, target: ObjectId) -> FsResult<ObjectMeta>;

    /// Read up to `len` bytes at `offset`. Short (or empty) at end of file.
    fn read_file(&self, id: ObjectId, offset: u64, len: usize) -> FsResult<Vec<u8>>;

    /// Write `data` at `offset`, zero-filling any gap past the current size.
    fn write_file(&self, id: ObjectId, offset: u64, data: &[u8]) -> FsResult<WriteOutcome>;

    /// Set the logical size of a file. Bytes beyond it read as zero.
    fn truncate(&self, id: ObjectId, new_size: u64) -> FsResult<()>;

    /// Collect every entry of `dir`, dots included.
    ///
    /// Default implementation walks [`Backend::iterate_dir`] from cursor 0.
    fn read_dir(&self, dir: ObjectId) -> FsResult<Vec<DirEntry>> {
        let mut entries = Vec::new();
        let mut cursor = 0;
        while let Some(entry) = self.iterate_dir(dir, cursor)? {
            entries.push(entry);
            cursor += 1;
        }
        Ok(entries)
    }

    /// Resolve a slash-separated path from the root with repeated lookups.
    ///
    /// Empty components are skipped, so "/", "" and "a//b" are accepted.
    /// "." and ".." are not interpreted.
    fn resolve(&self, path: &str) -> FsResult<ObjectMeta> {
        let mut current = self.get_root()?;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            if !current.is_dir() {
                return Err(FsError::NotADirectory(format!(
                    "{component:?} under non-directory {}",
                    current.id
                )));
            }
            current = self.lookup(current.id, component)?;
        }
        Ok(current)
    }
}
