//! Wire protocol for vtfs.
//!
//! A remote call is one HTTP request: the operation name in the path, the
//! arguments as an escaped query string, and (for `write`) the raw payload as
//! the body. The reply is a little-endian `i64` status followed by a
//! fixed-layout record sized for the operation's result.

pub mod codec;
pub mod endpoint;
pub mod error;
pub mod escape;
pub mod record;
pub mod request;

pub use codec::Reply;
pub use endpoint::{endpoints, HealthResponse, MAX_BODY_SIZE, PROTOCOL_VERSION};
pub use error::{ProtocolError, ProtocolResult};
pub use escape::{escape, unescape};
pub use record::{ReadPayload, WireRecord};
pub use request::{args, query_param, RpcRequest};
