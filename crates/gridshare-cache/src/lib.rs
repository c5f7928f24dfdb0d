//! Lookup cache for gridshare.
//!
//! Sits in front of the storage backend and remembers documents that were
//! already resolved, keyed by `(GridId, Visibility)`. Documents never
//! change after they are written, so entries are never invalidated; they
//! are only evicted when the cache is full.
//!
//! # Backends
//!
//! All backends implement the [`LookupCache`] trait:
//!
//! - [`InMemoryLookupCache`] -- bounded LRU behind a mutex
//! - [`DisabledCache`] -- always misses
//!
//! # Design Rules
//!
//! 1. A cache error is never fatal. Callers downgrade it to a miss.
//! 2. Keys are decoded ids, never raw tokens.
//! 3. Concurrent `get`/`put` on the same key is harmless: both writers
//!    store the same immutable document.

pub mod disabled;
pub mod error;
pub mod memory;
pub mod traits;

pub use disabled::DisabledCache;
pub use error::{CacheError, CacheResult};
pub use memory::{InMemoryLookupCache, DEFAULT_CAPACITY};
pub use traits::{CacheKey, CacheStats, LookupCache};
