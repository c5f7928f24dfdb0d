use gridshare_types::GridDocument;

use crate::error::CacheResult;
use crate::traits::{CacheKey, LookupCache};

/// A cache that remembers nothing. Every lookup goes to storage.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledCache;

impl LookupCache for DisabledCache {
    fn get(&self, _key: &CacheKey) -> CacheResult<Option<GridDocument>> {
        Ok(None)
    }

    fn put(&self, _key: CacheKey, _document: GridDocument) -> CacheResult<()> {
        Ok(())
    }
}
