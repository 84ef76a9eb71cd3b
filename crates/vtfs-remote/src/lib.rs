//! Remote backend for vtfs.
//!
//! [`RemoteStore`] implements [`vtfs_store::Backend`] by sending each
//! operation to a peer as one request over an [`RpcTransport`]. The default
//! transport is [`HttpTransport`], a blocking HTTP client. Nothing is cached
//! and nothing is retried: every call is exactly one round trip, and a
//! failed round trip is reported as a transport failure.

pub mod config;
pub mod store;
pub mod transport;

pub use config::RemoteConfig;
pub use store::RemoteStore;
pub use transport::{HttpTransport, RpcTransport};
