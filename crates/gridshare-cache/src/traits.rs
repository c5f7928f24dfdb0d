use std::fmt;

use serde::{Deserialize, Serialize};

use gridshare_types::{GridDocument, GridId, Visibility};

use crate::error::CacheResult;

/// Cache key: a decoded id qualified by its partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub id: GridId,
    pub visibility: Visibility,
}

impl CacheKey {
    pub fn new(id: GridId, visibility: Visibility) -> Self {
        Self { id, visibility }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.visibility, self.id)
    }
}

/// Hit/miss counters for a cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// Fast path for repeated document lookups.
///
/// Implementations must be safe for concurrent use. A returned `Err` means
/// the cache could not answer; callers treat it exactly like a miss.
pub trait LookupCache: Send + Sync {
    /// Look up a previously stored document.
    ///
    /// Returns `Ok(None)` on a miss.
    fn get(&self, key: &CacheKey) -> CacheResult<Option<GridDocument>>;

    /// Remember a document. May evict other entries.
    fn put(&self, key: CacheKey, document: GridDocument) -> CacheResult<()>;

    /// Counters, for caches that keep them.
    fn stats(&self) -> Option<CacheStats> {
        None
    }
}
