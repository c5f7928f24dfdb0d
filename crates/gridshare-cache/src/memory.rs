use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lru::LruCache;

use tracing::trace;

use gridshare_types::GridDocument;

use crate::error::{CacheError, CacheResult};
use crate::traits::{CacheKey, CacheStats, LookupCache};

/// Default number of documents kept by [`InMemoryLookupCache`].
pub const DEFAULT_CAPACITY: usize = 4096;

/// In-process LRU cache of resolved documents.
///
/// All entries live behind a single `Mutex`; a `get` must take the lock
/// mutably to refresh recency. Documents are cloned on read and write.
pub struct InMemoryLookupCache {
    entries: Mutex<LruCache<CacheKey, GridDocument>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryLookupCache {
    /// A capacity of 0 is raised to 1; use [`DisabledCache`] to cache nothing.
    ///
    /// [`DisabledCache`]: crate::DisabledCache
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Current counters. Entry counts read 0 if the lock is poisoned.
    pub fn snapshot(&self) -> CacheStats {
        let (entries, capacity) = self
            .entries
            .lock()
            .map(|map| (map.len(), map.cap().get()))
            .unwrap_or_default();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().entries
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryLookupCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LookupCache for InMemoryLookupCache {
    fn get(&self, key: &CacheKey) -> CacheResult<Option<GridDocument>> {
        let mut map = self
            .entries
            .lock()
            .map_err(|e| CacheError::Poisoned(e.to_string()))?;
        match map.get(key) {
            Some(doc) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(%key, "cache hit");
                Ok(Some(doc.clone()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(%key, "cache miss");
                Ok(None)
            }
        }
    }

    fn put(&self, key: CacheKey, document: GridDocument) -> CacheResult<()> {
        let mut map = self
            .entries
            .lock()
            .map_err(|e| CacheError::Poisoned(e.to_string()))?;
        if let Some((evicted, _)) = map.push(key, document) {
            if evicted != key {
                trace!(%evicted, "cache eviction");
            }
        }
        Ok(())
    }

    fn stats(&self) -> Option<CacheStats> {
        Some(self.snapshot())
    }
}

impl std::fmt::Debug for InMemoryLookupCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.snapshot();
        f.debug_struct("InMemoryLookupCache")
            .field("entries", &stats.entries)
            .field("capacity", &stats.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disabled::DisabledCache;
    use chrono::Utc;
    use gridshare_types::{GridClass, GridData, GridId, NewGrid, RuntimeVersion, Visibility};
    use std::sync::Arc;

    fn make_doc(id: u64, visibility: Visibility) -> GridDocument {
        NewGrid {
            visibility,
            library_version: "1.9".into(),
            runtime_version: RuntimeVersion::new(vec![serde_json::json!(3)]),
            grid_class: GridClass::BlockGrid,
            code_cells: None,
            grid_data: GridData::new(1, 1, true, vec![vec![[id as u32, 0, 0, 20]]]),
        }
        .into_document(GridId::new(id).unwrap(), Utc::now())
    }

    fn key(id: u64, visibility: Visibility) -> CacheKey {
        CacheKey::new(GridId::new(id).unwrap(), visibility)
    }

    #[test]
    fn miss_then_hit() {
        let cache = InMemoryLookupCache::new(8);
        let k = key(1, Visibility::Public);
        assert!(cache.get(&k).unwrap().is_none());

        let doc = make_doc(1, Visibility::Public);
        cache.put(k, doc.clone()).unwrap();
        assert_eq!(cache.get(&k).unwrap(), Some(doc));

        let stats = cache.snapshot();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn partitions_do_not_share_entries() {
        let cache = InMemoryLookupCache::new(8);
        cache
            .put(key(1, Visibility::Secret), make_doc(1, Visibility::Secret))
            .unwrap();
        assert!(cache.get(&key(1, Visibility::Public)).unwrap().is_none());
        assert!(cache.get(&key(1, Visibility::Secret)).unwrap().is_some());
    }

    #[test]
    fn capacity_is_enforced() {
        let cache = InMemoryLookupCache::new(3);
        for id in 1..=10 {
            cache
                .put(key(id, Visibility::Public), make_doc(id, Visibility::Public))
                .unwrap();
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.get(&key(1, Visibility::Public)).unwrap().is_none());
        assert!(cache.get(&key(10, Visibility::Public)).unwrap().is_some());
    }

    #[test]
    fn get_refreshes_recency() {
        let cache = InMemoryLookupCache::new(2);
        for id in 1..=2 {
            cache
                .put(key(id, Visibility::Public), make_doc(id, Visibility::Public))
                .unwrap();
        }
        cache.get(&key(1, Visibility::Public)).unwrap();
        cache
            .put(key(3, Visibility::Public), make_doc(3, Visibility::Public))
            .unwrap();
        assert!(cache.get(&key(1, Visibility::Public)).unwrap().is_some());
        assert!(cache.get(&key(2, Visibility::Public)).unwrap().is_none());
    }

    #[test]
    fn zero_capacity_still_holds_one_entry() {
        let cache = InMemoryLookupCache::new(0);
        assert_eq!(cache.snapshot().capacity, 1);
        cache
            .put(key(1, Visibility::Secret), make_doc(1, Visibility::Secret))
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn poisoned_lock_is_an_error_not_a_panic() {
        let cache = Arc::new(InMemoryLookupCache::new(4));
        let poisoner = Arc::clone(&cache);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("poison the cache lock");
        })
        .join();

        let err = cache.get(&key(1, Visibility::Public)).unwrap_err();
        assert!(matches!(err, CacheError::Poisoned(_)));
        assert!(cache.put(key(1, Visibility::Public), make_doc(1, Visibility::Public)).is_err());
    }

    #[test]
    fn concurrent_get_put() {
        let cache = Arc::new(InMemoryLookupCache::new(64));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for id in 1..=32u64 {
                        let k = key(id, Visibility::Public);
                        if cache.get(&k).unwrap().is_none() {
                            cache.put(k, make_doc(id, Visibility::Public)).unwrap();
                        }
                        let got = cache.get(&k).unwrap().expect("just inserted");
                        assert_eq!(got.id.get(), id, "thread {t}");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(cache.len(), 32);
    }

    #[test]
    fn disabled_cache_always_misses() {
        let cache = DisabledCache;
        let k = key(1, Visibility::Public);
        cache.put(k, make_doc(1, Visibility::Public)).unwrap();
        assert!(cache.get(&k).unwrap().is_none());
        assert!(cache.stats().is_none());
    }

    #[test]
    fn stats_through_trait_object() {
        let cache: Arc<dyn LookupCache> = Arc::new(InMemoryLookupCache::new(2));
        cache.get(&key(1, Visibility::Public)).unwrap();
        let stats = cache.stats().expect("in-memory cache keeps counters");
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.capacity, 2);
    }

    #[test]
    fn debug_format() {
        let cache = InMemoryLookupCache::new(5);
        let debug = format!("{cache:?}");
        assert!(debug.contains("InMemoryLookupCache"));
        assert!(debug.contains("capacity"));
    }
}
