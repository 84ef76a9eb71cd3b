use tracing::{debug, info, warn};
use vtfs_protocol::{args, ReadPayload, Reply, RpcRequest, WireRecord};
use vtfs_store::Backend;
use vtfs_types::{
    validate_name, Capabilities, DirEntry, FsError, FsResult, ObjectId, ObjectMeta, Operation,
    WriteOutcome,
};

use crate::config::RemoteConfig;
use crate::transport::{HttpTransport, RpcTransport};

/// Backend that forwards every operation to a peer.
///
/// Holds no filesystem state of its own. Names are checked locally before
/// anything is sent, and operations outside the configured capability set
/// fail with `Unsupported` without a round trip.
pub struct RemoteStore<T = HttpTransport> {
    transport: T,
    capabilities: Capabilities,
}

impl RemoteStore<HttpTransport> {
    /// HTTP-backed store built from `config`.
    pub fn connect(config: &RemoteConfig) -> FsResult<Self> {
        let transport = HttpTransport::new(config)?;
        let capabilities = config.capabilities()?;
        debug!(endpoint = %transport.endpoint(), %capabilities, "remote store configured");
        Ok(Self::new(transport).with_capabilities(capabilities))
    }
}

impl<T: RpcTransport> RemoteStore<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            capabilities: Capabilities::all(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One round trip. Returns the record bytes of a successful reply.
    fn call(&self, request: RpcRequest) -> FsResult<Vec<u8>> {
        let op = request.op();
        if !self.capabilities.contains(op) {
            return Err(FsError::Unsupported(format!("{op} is not offered by the peer")));
        }
        let raw = self.transport.call(&request).map_err(|err| {
            warn!(%op, error = %err, "rpc failed");
            err
        })?;
        let reply = Reply::decode(&raw).map_err(|e| FsError::malformed(format!("{op}: {e}")))?;
        debug!(%op, status = reply.status, bytes = reply.record.len(), "rpc");
        reply.into_result()
    }

    fn call_meta(&self, request: RpcRequest) -> FsResult<ObjectMeta> {
        let op = request.op();
        let record = self.call(request)?;
        let meta = ObjectMeta::decode_optional(&record)
            .map_err(|e| FsError::malformed(format!("{op}: {e}")))?
            .ok_or_else(|| FsError::NotFound(format!("{op}: peer returned no object")))?;
        if meta.id.is_null() {
            return Err(FsError::malformed(format!("{op}: object with id 0")));
        }
        Ok(meta)
    }

    fn entry_request(op: Operation, parent: ObjectId, name: &str) -> FsResult<RpcRequest> {
        validate_name(name)?;
        Ok(RpcRequest::new(op)
            .id(args::PARENT, parent)
            .name(args::NAME, name))
    }
}

impl<T: RpcTransport> Backend for RemoteStore<T> {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn initialize(&self) -> FsResult<()> {
        info!(capabilities = %self.capabilities, "remote backend ready");
        Ok(())
    }

    fn shutdown(&self) {
        info!("remote backend shut down");
    }

    fn get_root(&self) -> FsResult<ObjectMeta> {
        self.call_meta(RpcRequest::new(Operation::GetRoot))
    }

    fn lookup(&self, parent: ObjectId, name: &str) -> FsResult<ObjectMeta> {
        self.call_meta(Self::entry_request(Operation::Lookup, parent, name)?)
    }

    fn iterate_dir(&self, dir: ObjectId, cursor: u64) -> FsResult<Option<DirEntry>> {
        let record = self.call(
            RpcRequest::new(Operation::IterateDir)
                .id(args::DIR, dir)
                .num(args::OFFSET, cursor),
        )?;
        let entry = DirEntry::decode_optional(&record)
            .map_err(|e| FsError::malformed(format!("iterate_dir: {e}")))?;
        match entry {
            Some(entry) if entry.id.is_null() => Err(FsError::malformed(format!(
                "iterate_dir: entry {:?} with id 0",
                entry.name
            ))),
            entry => Ok(entry),
        }
    }

    fn create_file(&self, parent: ObjectId, name: &str, mode: u32) -> FsResult<ObjectMeta> {
        let request = Self::entry_request(Operation::Create, parent, name)?
            .num(args::MODE, u64::from(mode));
        self.call_meta(request)
    }

    fn make_dir(&self, parent: ObjectId, name: &str, mode: u32) -> FsResult<ObjectMeta> {
        let request = Self::entry_request(Operation::Mkdir, parent, name)?
            .num(args::MODE, u64::from(mode));
        self.call_meta(request)
    }

    fn unlink(&self, parent: ObjectId, name: &str) -> FsResult<()> {
        self.call(Self::entry_request(Operation::Unlink, parent, name)?)
            .map(drop)
    }

    fn remove_dir(&self, parent: ObjectId, name: &str) -> FsResult<()> {
        self.call(Self::entry_request(Operation::Rmdir, parent, name)?)
            .map(drop)
    }

    fn link(&self, parent: ObjectId, name: &str, target: ObjectId) -> FsResult<ObjectMeta> {
        let request =
            Self::entry_request(Operation::Link, parent, name)?.id(args::TARGET, target);
        self.call_meta(request)
    }

    fn read_file(&self, id: ObjectId, offset: u64, len: usize) -> FsResult<Vec<u8>> {
        let record = self.call(
            RpcRequest::new(Operation::Read)
                .id(args::INO, id)
                .num(args::OFFSET, offset)
                .num(args::LEN, len as u64),
        )?;
        let data =
            ReadPayload::decode(&record).map_err(|e| FsError::malformed(format!("read: {e}")))?;
        if data.len() > len {
            return Err(FsError::malformed(format!(
                "read: asked for {len} bytes, peer sent {}",
                data.len()
            )));
        }
        Ok(data)
    }

    fn write_file(&self, id: ObjectId, offset: u64, data: &[u8]) -> FsResult<WriteOutcome> {
        let record = self.call(
            RpcRequest::new(Operation::Write)
                .id(args::INO, id)
                .num(args::OFFSET, offset)
                .body(data),
        )?;
        WriteOutcome::decode(&record).map_err(|e| FsError::malformed(format!("write: {e}")))
    }

    fn truncate(&self, id: ObjectId, new_size: u64) -> FsResult<()> {
        self.call(
            RpcRequest::new(Operation::Truncate)
                .id(args::INO, id)
                .num(args::SIZE, new_size),
        )
        .map(drop)
    }
}

impl<T> std::fmt::Debug for RemoteStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use vtfs_types::{ErrorKind, NodeKind, TransportReason};

    /// Replays canned replies and records what was sent.
    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<FsResult<Vec<u8>>>>,
        sent: Mutex<Vec<RpcRequest>>,
    }

    impl Scripted {
        fn reply(self, reply: FsResult<Vec<u8>>) -> Self {
            self.replies.lock().unwrap().push_back(reply);
            self
        }

        fn ok(self, record: Vec<u8>) -> Self {
            self.reply(Ok(Reply::ok(record).encode()))
        }

        fn status(self, code: i64) -> Self {
            self.reply(Ok(Reply { status: code, record: Vec::new() }.encode()))
        }

        fn sent(&self) -> Vec<RpcRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl RpcTransport for Scripted {
        fn call(&self, request: &RpcRequest) -> FsResult<Vec<u8>> {
            self.sent.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FsError::transport(TransportReason::Connect, "no script")))
        }
    }

    fn file_meta(id: u64) -> ObjectMeta {
        ObjectMeta {
            id: ObjectId::new(id),
            parent: ObjectId::ROOT,
            kind: NodeKind::File,
            mode: 0o100644,
            size: 0,
            nlink: 1,
        }
    }

    // --- request encoding ----------------------------------------------

    #[test]
    fn create_sends_parent_name_mode() {
        let store = RemoteStore::new(Scripted::default().ok(file_meta(2).to_bytes().unwrap()));
        let meta = store.create_file(ObjectId::ROOT, "a b", 0o644).unwrap();
        assert_eq!(meta, file_meta(2));

        let sent = store.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].op(), Operation::Create);
        assert_eq!(sent[0].query_string(), "parent=1&name=a%20b&mode=420");
    }

    #[test]
    fn write_carries_payload_in_body() {
        let outcome = WriteOutcome { bytes_written: 3, new_size: 13 };
        let store = RemoteStore::new(Scripted::default().ok(outcome.to_bytes().unwrap()));
        assert_eq!(store.write_file(ObjectId::new(4), 10, b"xyz").unwrap(), outcome);
        let sent = store.transport().sent();
        assert_eq!(sent[0].query_string(), "ino=4&offset=10");
        assert_eq!(sent[0].payload(), b"xyz");
    }

    #[test]
    fn invalid_name_never_leaves_the_client() {
        let store = RemoteStore::new(Scripted::default());
        for name in ["", ".", "..", "a/b", "nul\0"] {
            let err = store.lookup(ObjectId::ROOT, name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{name:?}");
        }
        let long = "x".repeat(256);
        assert_eq!(
            store.create_file(ObjectId::ROOT, &long, 0o644).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert!(store.transport().sent().is_empty());
    }

    #[test]
    fn missing_capability_skips_round_trip() {
        let caps = Capabilities::from_ops([Operation::GetRoot, Operation::Lookup]);
        let store = RemoteStore::new(Scripted::default()).with_capabilities(caps);
        let err = store.create_file(ObjectId::ROOT, "f", 0o644).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(
            store.truncate(ObjectId::new(2), 0).unwrap_err().kind(),
            ErrorKind::Unsupported
        );
        assert!(store.transport().sent().is_empty());
        assert_eq!(Backend::capabilities(&store), caps);
    }

    // --- reply decoding ------------------------------------------------

    #[test]
    fn zeroed_meta_is_not_found() {
        let store = RemoteStore::new(Scripted::default().ok(ObjectMeta::empty_bytes()));
        assert!(store.lookup(ObjectId::ROOT, "ghost").unwrap_err().is_not_found());
    }

    #[test]
    fn null_id_is_never_an_object() {
        let mut meta = file_meta(0);
        meta.id = ObjectId::NULL;
        let ghost = DirEntry::new("ghost", ObjectId::NULL, NodeKind::File);
        let store = RemoteStore::new(
            Scripted::default()
                .ok(meta.to_bytes().unwrap())
                .ok(ghost.to_bytes().unwrap()),
        );

        let err = store.lookup(ObjectId::ROOT, "a").unwrap_err();
        assert!(matches!(
            err,
            FsError::Transport { reason: TransportReason::MalformedReply, .. }
        ));
        let err = store.iterate_dir(ObjectId::ROOT, 2).unwrap_err();
        assert!(matches!(
            err,
            FsError::Transport { reason: TransportReason::MalformedReply, .. }
        ));
    }

    #[test]
    fn eperm_status_is_passed_through() {
        let store = RemoteStore::new(Scripted::default().status(-1));
        let err = store.unlink(ObjectId::ROOT, "d").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn negative_status_maps_to_kind() {
        let store = RemoteStore::new(
            Scripted::default()
                .status(-17)
                .status(-39)
                .status(-1)
                .status(-13),
        );
        assert_eq!(
            store.make_dir(ObjectId::ROOT, "d", 0o755).unwrap_err().kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            store.remove_dir(ObjectId::ROOT, "d").unwrap_err().kind(),
            ErrorKind::NotEmpty
        );
        assert_eq!(
            store.unlink(ObjectId::ROOT, "d").unwrap_err().kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(
            store.unlink(ObjectId::ROOT, "f").unwrap_err(),
            FsError::Remote { code: -13 }
        );
    }

    #[test]
    fn end_of_directory() {
        let entry = DirEntry::new("a", ObjectId::new(2), NodeKind::File);
        let store = RemoteStore::new(
            Scripted::default()
                .ok(entry.to_bytes().unwrap())
                .ok(DirEntry::empty_bytes()),
        );
        assert_eq!(store.iterate_dir(ObjectId::ROOT, 2).unwrap(), Some(entry));
        assert_eq!(store.iterate_dir(ObjectId::ROOT, 3).unwrap(), None);
        assert_eq!(store.transport().sent()[1].query_string(), "dir=1&offset=3");
    }

    #[test]
    fn short_reply_is_malformed() {
        let store = RemoteStore::new(
            Scripted::default()
                .reply(Ok(vec![0, 0, 0]))
                .ok(vec![1, 2, 3]),
        );
        let err = store.get_root().unwrap_err();
        assert!(matches!(
            err,
            FsError::Transport { reason: TransportReason::MalformedReply, .. }
        ));
        let err = store.get_root().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
    }

    #[test]
    fn oversized_read_reply_is_malformed() {
        let store = RemoteStore::new(Scripted::default().ok(ReadPayload::encode(b"abcdef")));
        let err = store.read_file(ObjectId::new(2), 0, 4).unwrap_err();
        assert!(matches!(
            err,
            FsError::Transport { reason: TransportReason::MalformedReply, .. }
        ));
    }

    #[test]
    fn transport_failure_passes_through() {
        let store = RemoteStore::new(Scripted::default().reply(Err(FsError::transport(
            TransportReason::Timeout,
            "no reply within 5000ms",
        ))));
        let err = store.get_root().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        assert!(!err.is_not_found());
    }

    #[test]
    fn lifecycle_is_local() {
        let store = RemoteStore::new(Scripted::default());
        store.initialize().unwrap();
        store.shutdown();
        assert!(store.transport().sent().is_empty());
        assert_eq!(store.name(), "remote");
    }
}
