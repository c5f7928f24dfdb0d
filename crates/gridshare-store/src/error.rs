use std::io;

use gridshare_types::Visibility;

/// Errors from grid store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored frame failed its integrity check on read.
    #[error("corrupt frame in {partition} log at offset {offset}: {reason}")]
    CorruptFrame {
        partition: Visibility,
        offset: u64,
        reason: String,
    },

    /// A random pick was requested from a partition with no rows.
    #[error("no grids stored in the {0} partition")]
    EmptyPartition(Visibility),

    /// A lock guarding store state was poisoned.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
