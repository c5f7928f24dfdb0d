use std::fmt;

use serde::{Deserialize, Serialize};

/// Which partition a grid lives in.
///
/// Each partition has its own id sequence and its own codec salt, so a
/// token is only meaningful together with the visibility it was issued
/// under. Secret grids are never offered by random discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Secret,
}

impl Visibility {
    /// Both partitions, public first.
    pub const ALL: [Visibility; 2] = [Visibility::Public, Visibility::Secret];

    /// Map the wire-level `secret` flag to a partition.
    pub fn from_secret_flag(secret: bool) -> Self {
        if secret {
            Self::Secret
        } else {
            Self::Public
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret)
    }

    /// Table name used by storage backends.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Public => "public_grids",
            Self::Secret => "secret_grids",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Secret => write!(f, "secret"),
        }
    }
}
