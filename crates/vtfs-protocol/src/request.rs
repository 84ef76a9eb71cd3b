use vtfs_types::{ObjectId, Operation};

use crate::error::{ProtocolError, ProtocolResult};
use crate::escape::{escape, unescape};

/// Argument keys used by the operations.
pub mod args {
    pub const PARENT: &str = "parent";
    pub const NAME: &str = "name";
    pub const MODE: &str = "mode";
    pub const TARGET: &str = "target";
    pub const DIR: &str = "dir";
    pub const OFFSET: &str = "offset";
    pub const INO: &str = "ino";
    pub const LEN: &str = "len";
    pub const SIZE: &str = "size";
    pub const TOKEN: &str = "token";
}

/// One remote call: operation, ordered string arguments, optional payload.
///
/// Built with the typed setters on the client, and rebuilt from the query
/// string with [`RpcRequest::parse`] on the server. Values are held
/// unescaped; [`RpcRequest::query_string`] escapes each of them once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcRequest {
    op: Operation,
    args: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RpcRequest {
    pub fn new(op: Operation) -> Self {
        Self {
            op,
            args: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn arg(mut self, key: &str, value: impl Into<String>) -> Self {
        self.args.push((key.to_string(), value.into()));
        self
    }

    pub fn id(self, key: &str, id: ObjectId) -> Self {
        self.num(key, id.get())
    }

    pub fn num(self, key: &str, value: u64) -> Self {
        self.arg(key, value.to_string())
    }

    pub fn name(self, key: &str, name: &str) -> Self {
        self.arg(key, name)
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn op(&self) -> Operation {
        self.op
    }

    pub fn args(&self) -> &[(String, String)] {
        &self.args
    }

    pub fn payload(&self) -> &[u8] {
        &self.body
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.body
    }

    /// `key=value&...` in builder order, every part escaped.
    pub fn query_string(&self) -> String {
        self.args
            .iter()
            .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Rebuild a request from its parts as received by a server.
    pub fn parse(op: Operation, query: &str, body: Vec<u8>) -> ProtocolResult<Self> {
        let mut args = Vec::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (k, v) = pair
                .split_once('=')
                .ok_or_else(|| ProtocolError::MalformedQuery(format!("no '=' in {pair:?}")))?;
            args.push((unescape(k)?, unescape(v)?));
        }
        Ok(Self { op, args, body })
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn require(&self, key: &str) -> ProtocolResult<&str> {
        self.get(key)
            .ok_or_else(|| ProtocolError::MissingArgument(key.to_string()))
    }

    pub fn require_u64(&self, key: &str) -> ProtocolResult<u64> {
        let value = self.require(key)?;
        value.parse().map_err(|_| ProtocolError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn require_u32(&self, key: &str) -> ProtocolResult<u32> {
        let value = self.require(key)?;
        value.parse().map_err(|_| ProtocolError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn require_id(&self, key: &str) -> ProtocolResult<ObjectId> {
        self.require_u64(key).map(ObjectId::new)
    }
}

/// Look up a single value in a raw query string without parsing the rest
/// of the request.
pub fn query_param(query: &str, key: &str) -> ProtocolResult<Option<String>> {
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        if let Some((k, v)) = pair.split_once('=') {
            if unescape(k)? == key {
                return unescape(v).map(Some);
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_keeps_builder_order() {
        let req = RpcRequest::new(Operation::Create)
            .id(args::PARENT, ObjectId::ROOT)
            .name(args::NAME, "a b")
            .num(args::MODE, 0o644);
        assert_eq!(req.query_string(), "parent=1&name=a%20b&mode=420");
        assert_eq!(req.op(), Operation::Create);
        assert!(req.payload().is_empty());
    }

    #[test]
    fn reserved_characters_in_names_survive() {
        let name = "x&name=evil%2F";
        let req = RpcRequest::new(Operation::Lookup)
            .id(args::PARENT, ObjectId::new(7))
            .name(args::NAME, name);
        let parsed = RpcRequest::parse(Operation::Lookup, &req.query_string(), Vec::new()).unwrap();
        assert_eq!(parsed.require(args::NAME).unwrap(), name);
        assert_eq!(parsed.require_id(args::PARENT).unwrap(), ObjectId::new(7));
        assert_eq!(parsed, req);
    }

    #[test]
    fn body_is_separate_from_arguments() {
        let req = RpcRequest::new(Operation::Write)
            .id(args::INO, ObjectId::new(3))
            .num(args::OFFSET, 10)
            .body(b"payload".to_vec());
        assert_eq!(req.query_string(), "ino=3&offset=10");
        assert_eq!(req.payload(), b"payload");
        assert_eq!(req.into_payload(), b"payload");
    }

    #[test]
    fn empty_query_has_no_args() {
        let req = RpcRequest::parse(Operation::GetRoot, "", Vec::new()).unwrap();
        assert!(req.args().is_empty());
        assert_eq!(RpcRequest::new(Operation::GetRoot).query_string(), "");
    }

    #[test]
    fn missing_and_bad_numbers() {
        let req = RpcRequest::parse(Operation::Read, "ino=abc&offset=-1", Vec::new()).unwrap();
        assert!(matches!(
            req.require_id(args::INO),
            Err(ProtocolError::InvalidNumber { .. })
        ));
        assert!(matches!(
            req.require_u64(args::OFFSET),
            Err(ProtocolError::InvalidNumber { .. })
        ));
        assert!(matches!(
            req.require_u64(args::LEN),
            Err(ProtocolError::MissingArgument(_))
        ));
    }

    #[test]
    fn pair_without_equals_is_malformed() {
        let err = RpcRequest::parse(Operation::Lookup, "parent=1&name", Vec::new()).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedQuery(_)));
    }

    #[test]
    fn mode_out_of_range() {
        let req = RpcRequest::parse(Operation::Mkdir, "mode=4294967296", Vec::new()).unwrap();
        assert!(req.require_u32(args::MODE).is_err());
    }

    #[test]
    fn query_param_finds_escaped_value() {
        let query = "ino=3&token=a%26b";
        assert_eq!(query_param(query, args::TOKEN).unwrap().as_deref(), Some("a&b"));
        assert_eq!(query_param(query, "missing").unwrap(), None);
        assert_eq!(query_param("", args::TOKEN).unwrap(), None);
    }
}
