pub const PROTOCOL_VERSION: u32 = 1;

/// Largest request body (write payload) a peer accepts.
pub const MAX_BODY_SIZE: usize = 64 * 1024 * 1024;

/// HTTP endpoint paths for the vtfs protocol.
pub mod endpoints {
    pub const HEALTH: &str = "/v1/health";
    pub const RPC: &str = "/v1/rpc";

    /// Path of the RPC endpoint for one operation.
    pub fn rpc_path(op: vtfs_types::Operation) -> String {
        format!("{RPC}/{}", op.as_str())
    }
}

/// Health check response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub protocol_version: u32,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtfs_types::Operation;

    #[test]
    fn health_response_defaults() {
        let h = HealthResponse::default();
        assert_eq!(h.status, "ok");
        assert_eq!(h.protocol_version, 1);
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::HEALTH, "/v1/health");
        assert_eq!(endpoints::rpc_path(Operation::IterateDir), "/v1/rpc/iterate_dir");
        assert_eq!(endpoints::rpc_path(Operation::GetRoot), "/v1/rpc/get_root");
    }
}
