use std::borrow::Cow;

use crate::error::{ProtocolError, ProtocolResult};

/// Percent-escape an argument value.
///
/// Every byte outside `A-Z a-z 0-9 - . _ ~` is escaped, so `&`, `=`, `%`,
/// `/`, `+` and spaces never reach the query unprotected. Base-10 numbers
/// pass through unchanged.
pub fn escape(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Reverse [`escape`].
pub fn unescape(value: &str) -> ProtocolResult<String> {
    urlencoding::decode(value)
        .map(Cow::into_owned)
        .map_err(|_| ProtocolError::InvalidEscape(value.to_string()))
}
