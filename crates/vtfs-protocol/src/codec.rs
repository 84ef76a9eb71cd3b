use bytes::{Buf, BufMut};
use vtfs_types::{FsError, FsResult};

use crate::error::{ProtocolError, ProtocolResult};

/// A decoded reply: status plus the record bytes that follow it.
///
/// Framing: `[8 bytes i64 LE status][record]`. A negative status is the
/// failure code and any record bytes after it are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: i64,
    pub record: Vec<u8>,
}

impl Reply {
    pub const HEADER_LEN: usize = 8;

    pub fn ok(record: Vec<u8>) -> Self {
        Self { status: 0, record }
    }

    /// Failure reply carrying the error's status code.
    pub fn error(err: &FsError) -> Self {
        Self {
            status: err.code(),
            record: Vec::new(),
        }
    }

    pub fn from_result(result: FsResult<Vec<u8>>) -> Self {
        match result {
            Ok(record) => Self::ok(record),
            Err(err) => Self::error(&err),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::HEADER_LEN + self.record.len());
        buf.put_i64_le(self.status);
        buf.put_slice(&self.record);
        buf
    }

    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        if bytes.len() < Self::HEADER_LEN {
            return Err(ProtocolError::Truncated {
                expected: Self::HEADER_LEN,
                actual: bytes.len(),
            });
        }
        let mut buf = bytes;
        let status = buf.get_i64_le();
        Ok(Self {
            status,
            record: buf.to_vec(),
        })
    }

    /// The record on success; the status turned back into an error
    /// otherwise.
    pub fn into_result(self) -> FsResult<Vec<u8>> {
        if self.status < 0 {
            return Err(FsError::from_code(self.status));
        }
        Ok(self.record)
    }
}
