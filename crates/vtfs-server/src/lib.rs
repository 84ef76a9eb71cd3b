//! HTTP peer for vtfs.
//!
//! Serves any [`vtfs_store::Backend`] over the vtfs wire protocol. The
//! [`Dispatcher`] does the protocol work (argument parsing, backend call,
//! reply encoding) and knows nothing about HTTP; the router adds token
//! checks, body limits and request tracing on top.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use error::{ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::VtfsServer;
