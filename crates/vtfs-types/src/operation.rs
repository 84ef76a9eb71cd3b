use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FsError;

/// One call of the backend contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    GetRoot,
    Lookup,
    IterateDir,
    Create,
    Mkdir,
    Unlink,
    Rmdir,
    Link,
    Read,
    Write,
    Truncate,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Self::GetRoot,
        Self::Lookup,
        Self::IterateDir,
        Self::Create,
        Self::Mkdir,
        Self::Unlink,
        Self::Rmdir,
        Self::Link,
        Self::Read,
        Self::Write,
        Self::Truncate,
    ];

    /// Name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetRoot => "get_root",
            Self::Lookup => "lookup",
            Self::IterateDir => "iterate_dir",
            Self::Create => "create",
            Self::Mkdir => "mkdir",
            Self::Unlink => "unlink",
            Self::Rmdir => "rmdir",
            Self::Link => "link",
            Self::Read => "read",
            Self::Write => "write",
            Self::Truncate => "truncate",
        }
    }

    /// Whether the operation changes store state.
    pub fn is_mutation(self) -> bool {
        !matches!(
            self,
            Self::GetRoot | Self::Lookup | Self::IterateDir | Self::Read
        )
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| FsError::Unsupported(format!("unknown operation {s:?}")))
    }
}

/// The set of operations a backend implements.
///
/// A backend asked for an operation outside its set answers
/// `Unsupported` deterministically.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u16);

impl Capabilities {
    pub fn all() -> Self {
        Self::from_ops(Operation::ALL)
    }

    pub fn none() -> Self {
        Self(0)
    }

    pub fn from_ops(ops: impl IntoIterator<Item = Operation>) -> Self {
        Self(ops.into_iter().fold(0, |acc, op| acc | op.bit()))
    }

    /// Parse a list of wire names, e.g. from configuration.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, FsError> {
        let mut caps = Self::none();
        for name in names {
            caps = caps.with(name.parse()?);
        }
        Ok(caps)
    }

    pub fn with(self, op: Operation) -> Self {
        Self(self.0 | op.bit())
    }

    pub fn without(self, op: Operation) -> Self {
        Self(self.0 & !op.bit())
    }

    pub fn contains(self, op: Operation) -> bool {
        self.0 & op.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Operation> {
        Operation::ALL.into_iter().filter(move |op| self.contains(*op))
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Operation::as_str)).finish()
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Operation::as_str).collect();
        f.write_str(&names.join(","))
    }
}
