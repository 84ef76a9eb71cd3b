use std::sync::Arc;

use tracing::debug;
use vtfs_protocol::{args, ProtocolError, ReadPayload, Reply, RpcRequest, WireRecord};
use vtfs_store::Backend;
use vtfs_types::{DirEntry, FsError, FsResult, Operation};

/// Executes protocol requests against a backend.
///
/// Every outcome, including unknown operations and unparseable arguments,
/// becomes a reply status. Nothing here fails at the transport level.
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn Backend>,
}

fn bad_request(err: ProtocolError) -> FsError {
    FsError::InvalidArgument(err.to_string())
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Turn the raw parts of a request into an [`RpcRequest`].
    pub fn parse(op: &str, query: &str, body: Vec<u8>) -> FsResult<RpcRequest> {
        let op: Operation = op.parse()?;
        RpcRequest::parse(op, query, body).map_err(bad_request)
    }

    /// Handle a request given as raw parts and return the encoded reply.
    pub fn handle(&self, op: &str, query: &str, body: Vec<u8>) -> Vec<u8> {
        let result = Self::parse(op, query, body).and_then(|request| self.execute(&request));
        Reply::from_result(result).encode()
    }

    /// Run one parsed request and return the encoded reply.
    pub fn respond(&self, request: &RpcRequest) -> Vec<u8> {
        Reply::from_result(self.execute(request)).encode()
    }

    /// Run one parsed request and return its reply record.
    pub fn execute(&self, request: &RpcRequest) -> FsResult<Vec<u8>> {
        let op = request.op();
        if !self.backend.capabilities().contains(op) {
            return Err(FsError::Unsupported(format!(
                "{op} is not offered by the {} backend",
                self.backend.name()
            )));
        }
        let result = self.run(request);
        debug!(%op, ok = result.is_ok(), "dispatched");
        result
    }

    fn run(&self, req: &RpcRequest) -> FsResult<Vec<u8>> {
        let backend = self.backend.as_ref();
        let id = |key| req.require_id(key).map_err(bad_request);
        let num = |key| req.require_u64(key).map_err(bad_request);
        let mode = || req.require_u32(args::MODE).map_err(bad_request);
        let name = || req.require(args::NAME).map_err(bad_request);

        match req.op() {
            Operation::GetRoot => meta(backend.get_root()?),
            Operation::Lookup => meta(backend.lookup(id(args::PARENT)?, name()?)?),
            Operation::IterateDir => {
                match backend.iterate_dir(id(args::DIR)?, num(args::OFFSET)?)? {
                    Some(entry) => encode(&entry),
                    None => Ok(DirEntry::empty_bytes()),
                }
            }
            Operation::Create => {
                meta(backend.create_file(id(args::PARENT)?, name()?, mode()?)?)
            }
            Operation::Mkdir => meta(backend.make_dir(id(args::PARENT)?, name()?, mode()?)?),
            Operation::Unlink => {
                backend.unlink(id(args::PARENT)?, name()?)?;
                Ok(Vec::new())
            }
            Operation::Rmdir => {
                backend.remove_dir(id(args::PARENT)?, name()?)?;
                Ok(Vec::new())
            }
            Operation::Link => {
                meta(backend.link(id(args::PARENT)?, name()?, id(args::TARGET)?)?)
            }
            Operation::Read => {
                let len = usize::try_from(num(args::LEN)?)
                    .map_err(|_| FsError::InvalidArgument("read length too large".into()))?;
                let data = backend.read_file(id(args::INO)?, num(args::OFFSET)?, len)?;
                Ok(ReadPayload::encode(&data))
            }
            Operation::Write => {
                let outcome =
                    backend.write_file(id(args::INO)?, num(args::OFFSET)?, req.payload())?;
                encode(&outcome)
            }
            Operation::Truncate => {
                backend.truncate(id(args::INO)?, num(args::SIZE)?)?;
                Ok(Vec::new())
            }
        }
    }
}

fn encode(record: &impl WireRecord) -> FsResult<Vec<u8>> {
    record.to_bytes().map_err(bad_request)
}

fn meta(meta: vtfs_types::ObjectMeta) -> FsResult<Vec<u8>> {
    encode(&meta)
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("backend", &self.backend.name())
            .finish()
    }
}
