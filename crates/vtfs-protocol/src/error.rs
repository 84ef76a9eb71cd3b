use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("record length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("reply too short: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("invalid node kind tag: {0}")]
    InvalidKind(u32),

    #[error("invalid entry name: {0}")]
    InvalidName(String),

    #[error("invalid escape sequence in {0:?}")]
    InvalidEscape(String),

    #[error("malformed query: {0}")]
    MalformedQuery(String),

    #[error("missing argument: {0}")]
    MissingArgument(String),

    #[error("argument {key} is not a number: {value:?}")]
    InvalidNumber { key: String, value: String },
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
