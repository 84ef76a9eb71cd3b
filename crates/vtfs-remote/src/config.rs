use std::time::Duration;

use serde::{Deserialize, Serialize};
use vtfs_types::{Capabilities, FsResult};

/// Connection settings for a [`crate::RemoteStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the peer, e.g. `http://127.0.0.1:7878`.
    pub endpoint: String,
    /// Access token sent with every request.
    pub token: Option<String>,
    /// Upper bound on one round trip.
    pub timeout_ms: u64,
    /// Operation names the peer implements. `None` means all of them.
    pub capabilities: Option<Vec<String>>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:7878".into(),
            token: None,
            timeout_ms: 5000,
            capabilities: None,
        }
    }
}

impl RemoteConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolve the configured operation names. Unknown names are rejected.
    pub fn capabilities(&self) -> FsResult<Capabilities> {
        match &self.capabilities {
            None => Ok(Capabilities::all()),
            Some(names) => Capabilities::from_names(names.iter().map(String::as_str)),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
