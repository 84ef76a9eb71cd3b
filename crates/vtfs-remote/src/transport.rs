use reqwest::blocking::Client;
use reqwest::StatusCode;
use vtfs_protocol::{args, endpoints, escape, RpcRequest};
use vtfs_types::{FsError, FsResult, TransportReason};

use crate::config::RemoteConfig;

/// Carries one encoded request to a peer and returns the raw reply bytes.
///
/// Implementations report only delivery problems. Decoding the reply and
/// turning its status into an error is left to the caller.
pub trait RpcTransport: Send + Sync {
    fn call(&self, request: &RpcRequest) -> FsResult<Vec<u8>>;
}

impl<T: RpcTransport + ?Sized> RpcTransport for std::sync::Arc<T> {
    fn call(&self, request: &RpcRequest) -> FsResult<Vec<u8>> {
        (**self).call(request)
    }
}

/// Blocking HTTP transport.
///
/// Each request is `POST {endpoint}/v1/rpc/{op}?{args}[&token=..]` with the
/// write payload as the body. The client timeout bounds the whole round
/// trip.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    token: Option<String>,
    timeout_ms: u64,
}

impl HttpTransport {
    pub fn new(config: &RemoteConfig) -> FsResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FsError::transport(TransportReason::Connect, e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full request URL, token included.
    pub fn url(&self, request: &RpcRequest) -> String {
        let mut query = request.query_string();
        if let Some(token) = &self.token {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(args::TOKEN);
            query.push('=');
            query.push_str(&escape(token));
        }
        let path = endpoints::rpc_path(request.op());
        if query.is_empty() {
            format!("{}{path}", self.endpoint)
        } else {
            format!("{}{path}?{query}", self.endpoint)
        }
    }

    fn classify(&self, err: reqwest::Error) -> FsError {
        let reason = if err.is_timeout() {
            TransportReason::Timeout
        } else if err.is_connect() {
            TransportReason::Connect
        } else if err.is_body() || err.is_decode() {
            TransportReason::MalformedReply
        } else {
            TransportReason::Connect
        };
        if reason == TransportReason::Timeout {
            return FsError::transport(reason, format!("no reply within {}ms", self.timeout_ms));
        }
        FsError::transport(reason, err.to_string())
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl RpcTransport for HttpTransport {
    fn call(&self, request: &RpcRequest) -> FsResult<Vec<u8>> {
        let response = self
            .client
            .post(self.url(request))
            .body(request.payload().to_vec())
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(FsError::transport(
                TransportReason::Unauthorized,
                "peer rejected the token",
            ));
        }
        if !status.is_success() {
            return Err(FsError::transport(
                TransportReason::HttpStatus(status.as_u16()),
                format!("{} {}", request.op(), status),
            ));
        }

        let bytes = response.bytes().map_err(|e| self.classify(e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtfs_types::{ObjectId, Operation};

    fn transport(token: Option<&str>) -> HttpTransport {
        let mut config = RemoteConfig::new("http://127.0.0.1:7878/");
        config.token = token.map(String::from);
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn url_without_arguments() {
        let t = transport(None);
        assert_eq!(t.endpoint(), "http://127.0.0.1:7878");
        assert_eq!(
            t.url(&RpcRequest::new(Operation::GetRoot)),
            "http://127.0.0.1:7878/v1/rpc/get_root"
        );
    }

    #[test]
    fn url_escapes_names_and_appends_token() {
        let t = transport(Some("dev token"));
        let req = RpcRequest::new(Operation::Lookup)
            .id(args::PARENT, ObjectId::ROOT)
            .name(args::NAME, "a&b");
        assert_eq!(
            t.url(&req),
            "http://127.0.0.1:7878/v1/rpc/lookup?parent=1&name=a%26b&token=dev%20token"
        );
    }

    #[test]
    fn token_only_query() {
        let t = transport(Some("devtoken"));
        assert_eq!(
            t.url(&RpcRequest::new(Operation::GetRoot)),
            "http://127.0.0.1:7878/v1/rpc/get_root?token=devtoken"
        );
    }

    #[test]
    fn debug_hides_token() {
        let shown = format!("{:?}", transport(Some("secret")));
        assert!(!shown.contains("secret"));
    }
}
