use thiserror::Error;

/// Reasons a grid submission is rejected before it reaches storage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("runtime version must have exactly {expected} components, got {actual}")]
    RuntimeVersionLength { expected: usize, actual: usize },

    #[error("invalid library version: {0:?}")]
    LibraryVersion(String),

    #[error("code_cells must be null or a non-empty array")]
    EmptyCodeCells,

    #[error("grid dimension {name} must be at least 1")]
    ZeroDimension { name: &'static str },

    #[error("grid has no blocks")]
    NoBlocks,

    #[error("block row {row} is empty")]
    EmptyRow { row: usize },

    #[error("block rows are ragged: row {row} has {actual} blocks, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
}
