use std::fmt;

use serde::{Deserialize, Serialize};

/// Partition-local row identifier assigned by the store.
///
/// Ids start at 1 and increase monotonically within a partition. A public
/// id 1 and a secret id 1 are different grids. Ids never leave the
/// process; clients only ever see a [`GridToken`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridId(u64);

impl GridId {
    /// The first id handed out in an empty partition.
    pub const FIRST: GridId = GridId(1);

    /// Wrap a raw value. Returns `None` for 0, which is never assigned.
    pub fn new(raw: u64) -> Option<Self> {
        (raw >= 1).then_some(Self(raw))
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridId({})", self.0)
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public, obfuscated identifier for a grid.
///
/// A token carries no visibility of its own: the caller decides which
/// partition a token belongs to (for HTTP, from the URL prefix).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridToken(String);

impl GridToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for GridToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridToken({})", self.0)
    }
}

impl fmt::Display for GridToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GridToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
