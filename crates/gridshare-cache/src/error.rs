/// Errors from lookup cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache backend cannot be reached.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// A lock guarding cache state was poisoned by a panicking thread.
    #[error("cache lock poisoned: {0}")]
    Poisoned(String),
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
