use std::fmt;

use thiserror::Error;

/// Classified failure of a backend operation.
///
/// Every backend reports through this type, so callers can translate
/// failures without knowing which backend is active. The string payloads are
/// context for humans; compare failures with [`FsError::kind`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("directory not empty: {0}")]
    NotEmpty(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request could not be completed (remote backend only).
    #[error("transport failure ({reason}): {detail}")]
    Transport {
        reason: TransportReason,
        detail: String,
    },

    /// A negative status from the peer that is not the canonical code of a
    /// kind: either unknown, or an alias such as `-1`. The code is kept
    /// exactly as received; [`FsError::kind`] still classifies aliases.
    #[error("remote status {code}")]
    Remote { code: i64 },
}

/// Result alias for backend operations.
pub type FsResult<T> = Result<T, FsError>;

/// Backend-independent error classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    NotADirectory,
    IsADirectory,
    NotEmpty,
    Unsupported,
    ResourceExhausted,
    InvalidArgument,
    TransportFailure,
}

impl ErrorKind {
    /// Negative status code carried on the wire (errno numbering).
    pub fn code(self) -> i64 {
        match self {
            Self::NotFound => -2,
            Self::TransportFailure => -5,
            Self::ResourceExhausted => -12,
            Self::AlreadyExists => -17,
            Self::NotADirectory => -20,
            Self::IsADirectory => -21,
            Self::InvalidArgument => -22,
            Self::Unsupported => -38,
            Self::NotEmpty => -39,
        }
    }

    /// Inverse of [`ErrorKind::code`]. `-1` (EPERM) is what older peers
    /// answer for link/unlink against the wrong kind, so it reads as
    /// `Unsupported`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 | -38 => Some(Self::Unsupported),
            -2 => Some(Self::NotFound),
            -5 => Some(Self::TransportFailure),
            -12 => Some(Self::ResourceExhausted),
            -17 => Some(Self::AlreadyExists),
            -20 => Some(Self::NotADirectory),
            -21 => Some(Self::IsADirectory),
            -22 => Some(Self::InvalidArgument),
            -39 => Some(Self::NotEmpty),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not-found",
            Self::AlreadyExists => "already-exists",
            Self::NotADirectory => "not-a-directory",
            Self::IsADirectory => "is-a-directory",
            Self::NotEmpty => "not-empty",
            Self::Unsupported => "unsupported",
            Self::ResourceExhausted => "resource-exhausted",
            Self::InvalidArgument => "invalid-argument",
            Self::TransportFailure => "transport-failure",
        };
        f.write_str(s)
    }
}

/// Why a remote request could not be completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportReason {
    Timeout,
    Connect,
    Unauthorized,
    HttpStatus(u16),
    MalformedReply,
}

impl fmt::Display for TransportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connect => write!(f, "connect"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::HttpStatus(code) => write!(f, "http {code}"),
            Self::MalformedReply => write!(f, "malformed reply"),
        }
    }
}

impl FsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::NotADirectory(_) => ErrorKind::NotADirectory,
            Self::IsADirectory(_) => ErrorKind::IsADirectory,
            Self::NotEmpty(_) => ErrorKind::NotEmpty,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Transport { .. } => ErrorKind::TransportFailure,
            Self::Remote { code } => {
                ErrorKind::from_code(*code).unwrap_or(ErrorKind::TransportFailure)
            }
        }
    }

    /// Status code to put on the wire for this failure.
    pub fn code(&self) -> i64 {
        match self {
            Self::Remote { code } => *code,
            other => other.kind().code(),
        }
    }

    /// Rebuild a failure from a negative status received from a peer.
    ///
    /// `code()` of the result is always `code`, so a relayed failure goes
    /// back on the wire unchanged.
    pub fn from_code(code: i64) -> Self {
        let context = || format!("peer status {code}");
        match ErrorKind::from_code(code).filter(|kind| kind.code() == code) {
            Some(ErrorKind::NotFound) => Self::NotFound(context()),
            Some(ErrorKind::AlreadyExists) => Self::AlreadyExists(context()),
            Some(ErrorKind::NotADirectory) => Self::NotADirectory(context()),
            Some(ErrorKind::IsADirectory) => Self::IsADirectory(context()),
            Some(ErrorKind::NotEmpty) => Self::NotEmpty(context()),
            Some(ErrorKind::Unsupported) => Self::Unsupported(context()),
            Some(ErrorKind::ResourceExhausted) => Self::ResourceExhausted(context()),
            Some(ErrorKind::InvalidArgument) => Self::InvalidArgument(context()),
            Some(ErrorKind::TransportFailure) | None => Self::Remote { code },
        }
    }

    pub fn transport(reason: TransportReason, detail: impl Into<String>) -> Self {
        Self::Transport {
            reason,
            detail: detail.into(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::transport(TransportReason::MalformedReply, detail)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
