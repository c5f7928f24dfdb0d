use thiserror::Error;

use gridshare_types::{GridId, ValidationError, Visibility};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("invalid grid: {0}")]
    Validation(#[from] ValidationError),

    #[error("store error: {0}")]
    Store(#[from] gridshare_store::StoreError),

    #[error("codec error: {0}")]
    Codec(#[from] gridshare_codec::CodecError),

    #[error("no public grids have been stored yet")]
    NoPublicGrids,

    /// A row the store just reported is gone.
    #[error("grid {id} missing from the {visibility} partition")]
    Inconsistent { visibility: Visibility, id: GridId },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type RepoResult<T> = Result<T, RepoError>;
