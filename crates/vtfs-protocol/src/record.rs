//! Fixed-layout reply records.
//!
//! All integers are little-endian. Layouts:
//!
//! | record | bytes | fields |
//! |---|---|---|
//! | meta | 40 | id u64, parent u64, kind u32, mode u32, size u64, nlink u32, reserved u32 |
//! | dirent | 272 | name [u8; 256] NUL-padded, id u64, kind u32, reserved u32 |
//! | write | 16 | bytes_written u64, new_size u64 |
//! | read | 8 + n | length u64, then `length` bytes |
//!
//! An all-zero meta or dirent record means "no result".

use bytes::{Buf, BufMut};
use vtfs_types::{DirEntry, NodeKind, ObjectId, ObjectMeta, WriteOutcome, NAME_MAX};

use crate::error::{ProtocolError, ProtocolResult};

/// Bytes reserved for a name inside a dirent record.
pub const DIRENT_NAME_LEN: usize = NAME_MAX + 1;

/// A reply record with a fixed size.
pub trait WireRecord: Sized {
    const LEN: usize;

    /// Append exactly `LEN` bytes.
    fn put(&self, buf: &mut impl BufMut) -> ProtocolResult<()>;

    /// Read exactly `LEN` bytes.
    fn get(buf: &mut impl Buf) -> ProtocolResult<Self>;

    fn to_bytes(&self) -> ProtocolResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(Self::LEN);
        self.put(&mut buf)?;
        Ok(buf)
    }

    /// Decode a record that must be present.
    fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        check_len(bytes, Self::LEN)?;
        let mut buf = bytes;
        Self::get(&mut buf)
    }

    /// Decode a record where all zeros mean "no result".
    fn decode_optional(bytes: &[u8]) -> ProtocolResult<Option<Self>> {
        check_len(bytes, Self::LEN)?;
        if bytes.iter().all(|b| *b == 0) {
            return Ok(None);
        }
        let mut buf = bytes;
        Self::get(&mut buf).map(Some)
    }

    /// The all-zero record.
    fn empty_bytes() -> Vec<u8> {
        vec![0; Self::LEN]
    }
}

fn check_len(bytes: &[u8], expected: usize) -> ProtocolResult<()> {
    if bytes.len() != expected {
        return Err(ProtocolError::LengthMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn kind_from_tag(tag: u32) -> ProtocolResult<NodeKind> {
    NodeKind::from_tag(tag).ok_or(ProtocolError::InvalidKind(tag))
}

impl WireRecord for ObjectMeta {
    const LEN: usize = 40;

    fn put(&self, buf: &mut impl BufMut) -> ProtocolResult<()> {
        buf.put_u64_le(self.id.get());
        buf.put_u64_le(self.parent.get());
        buf.put_u32_le(self.kind.tag());
        buf.put_u32_le(self.mode);
        buf.put_u64_le(self.size);
        buf.put_u32_le(self.nlink);
        buf.put_u32_le(0);
        Ok(())
    }

    fn get(buf: &mut impl Buf) -> ProtocolResult<Self> {
        let id = ObjectId::new(buf.get_u64_le());
        let parent = ObjectId::new(buf.get_u64_le());
        let kind = kind_from_tag(buf.get_u32_le())?;
        let mode = buf.get_u32_le();
        let size = buf.get_u64_le();
        let nlink = buf.get_u32_le();
        let _reserved = buf.get_u32_le();
        Ok(Self {
            id,
            parent,
            kind,
            mode,
            size,
            nlink,
        })
    }
}

impl WireRecord for DirEntry {
    const LEN: usize = DIRENT_NAME_LEN + 16;

    fn put(&self, buf: &mut impl BufMut) -> ProtocolResult<()> {
        let name = self.name.as_bytes();
        if name.is_empty() || name.len() > NAME_MAX || name.contains(&0) {
            return Err(ProtocolError::InvalidName(self.name.clone()));
        }
        buf.put_slice(name);
        buf.put_bytes(0, DIRENT_NAME_LEN - name.len());
        buf.put_u64_le(self.id.get());
        buf.put_u32_le(self.kind.tag());
        buf.put_u32_le(0);
        Ok(())
    }

    fn get(buf: &mut impl Buf) -> ProtocolResult<Self> {
        let mut raw = [0u8; DIRENT_NAME_LEN];
        buf.copy_to_slice(&mut raw);
        let end = raw.iter().position(|b| *b == 0).unwrap_or(DIRENT_NAME_LEN);
        let name = std::str::from_utf8(&raw[..end])
            .map_err(|_| ProtocolError::InvalidName(String::from_utf8_lossy(&raw[..end]).into()))?
            .to_string();
        let id = ObjectId::new(buf.get_u64_le());
        let kind = kind_from_tag(buf.get_u32_le())?;
        let _reserved = buf.get_u32_le();
        Ok(Self { name, id, kind })
    }
}

impl WireRecord for WriteOutcome {
    const LEN: usize = 16;

    fn put(&self, buf: &mut impl BufMut) -> ProtocolResult<()> {
        buf.put_u64_le(self.bytes_written);
        buf.put_u64_le(self.new_size);
        Ok(())
    }

    fn get(buf: &mut impl Buf) -> ProtocolResult<Self> {
        Ok(Self {
            bytes_written: buf.get_u64_le(),
            new_size: buf.get_u64_le(),
        })
    }
}

/// Length-prefixed `read` reply.
pub struct ReadPayload;

impl ReadPayload {
    pub fn encode(data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + data.len());
        buf.put_u64_le(data.len() as u64);
        buf.put_slice(data);
        buf
    }

    pub fn decode(bytes: &[u8]) -> ProtocolResult<Vec<u8>> {
        if bytes.len() < 8 {
            return Err(ProtocolError::Truncated {
                expected: 8,
                actual: bytes.len(),
            });
        }
        let mut buf = bytes;
        let len = buf.get_u64_le();
        if len != buf.remaining() as u64 {
            return Err(ProtocolError::LengthMismatch {
                expected: 8usize.saturating_add(len.try_into().unwrap_or(usize::MAX)),
                actual: bytes.len(),
            });
        }
        Ok(buf.to_vec())
    }
}
