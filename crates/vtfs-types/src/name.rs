use crate::error::{FsError, FsResult};

/// Longest permitted entry name, in bytes.
pub const NAME_MAX: usize = 255;

/// Check that `name` may be bound in a directory.
///
/// Both backends run this before touching any state or the network, so a
/// bad name fails the same way everywhere.
pub fn validate_name(name: &str) -> FsResult<()> {
    if name.is_empty() {
        return Err(FsError::InvalidArgument("empty name".into()));
    }
    if name.len() > NAME_MAX {
        return Err(FsError::InvalidArgument(format!(
            "name is {} bytes (max {NAME_MAX})",
            name.len()
        )));
    }
    if name == "." || name == ".." {
        return Err(FsError::InvalidArgument(format!("reserved name {name:?}")));
    }
    if name.bytes().any(|b| b == b'/' || b == 0) {
        return Err(FsError::InvalidArgument(format!(
            "name {name:?} contains '/' or NUL"
        )));
    }
    Ok(())
}
