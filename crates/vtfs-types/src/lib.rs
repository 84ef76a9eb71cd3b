//! Foundation types for vtfs.
//!
//! This crate provides the storage object model shared by every vtfs
//! backend. It contains no storage logic: only identifiers, metadata views,
//! the operation vocabulary, and the error classification that both the
//! local and the remote backend must report identically.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Store-unique object identifier (`1` is the root)
//! - [`NodeKind`]: Directory or file
//! - [`ObjectMeta`]: Metadata view returned by object-producing operations
//! - [`DirEntry`]: One step of directory iteration
//! - [`Operation`] / [`Capabilities`]: The contract's operation set
//! - [`FsError`] / [`ErrorKind`]: Classified failures with stable status codes

pub mod error;
pub mod name;
pub mod object;
pub mod operation;

pub use error::{ErrorKind, FsError, FsResult, TransportReason};
pub use name::{validate_name, NAME_MAX};
pub use object::{DirEntry, NodeKind, ObjectId, ObjectMeta, WriteOutcome};
pub use operation::{Capabilities, Operation};
