//! Backend contract and in-memory tree store for vtfs.
//!
//! A vtfs backend is a metadata-and-data store with a hierarchical
//! namespace: directories, files, hard links, resumable directory iteration,
//! sparse writes and truncation. The glue layer that adapts these calls to
//! an operating system depends only on the [`Backend`] trait.
//!
//! # Storage Backends
//!
//! - [`LocalTreeStore`] -- arena of objects held in process memory
//! - `vtfs_remote::RemoteStore` -- forwards every call to an RPC peer
//!
//! # Design Rules
//!
//! 1. Every operation either succeeds or fails with a classified
//!    [`FsError`](vtfs_types::FsError); there is no partial success.
//! 2. Failed operations leave the store unchanged.
//! 3. Reads may run concurrently; any mutation is exclusive.
//! 4. Object ids are never reused while the store is live.
//! 5. Operations outside a backend's [`Capabilities`](vtfs_types::Capabilities)
//!    return `Unsupported`, never placeholder metadata.

pub mod config;
pub mod local;
pub mod object;
pub mod traits;

pub use config::LocalStoreConfig;
pub use local::{LocalTreeStore, StoreStats};
pub use object::{Content, DirectoryNode, FileNode, StorageObject};
pub use traits::Backend;
