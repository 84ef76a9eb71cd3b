use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vtfs_protocol::MAX_BODY_SIZE;
use vtfs_store::LocalStoreConfig;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Required `token` query value. `None` accepts every request.
    pub token: Option<String>,
    /// Largest request body in bytes; larger requests get HTTP 413.
    pub max_body_size: usize,
    /// Limits for the local store the server hosts.
    pub store: LocalStoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7878)),
            token: None,
            max_body_size: MAX_BODY_SIZE,
            store: LocalStoreConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }
}
