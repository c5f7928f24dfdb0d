use rand::Rng;

use gridshare_types::{GridDocument, GridId, NewGrid, Visibility};

use crate::error::StoreResult;

/// Partitioned, insertion-ordered grid storage.
///
/// All implementations must satisfy these invariants:
/// - Ids start at 1 in each partition and increase by one per insert.
/// - Concurrent inserts into one partition never receive the same id.
/// - A row is durable once `insert` returns.
/// - Documents are returned exactly as inserted, plus `id` and `created_at`.
pub trait GridStore: Send + Sync {
    /// Append a grid to its partition and return the assigned id.
    fn insert(&self, grid: &NewGrid) -> StoreResult<GridId>;

    /// Read a grid by partition and id.
    ///
    /// Returns `Ok(None)` if no such row exists.
    /// Returns `Err` on I/O failure or data corruption.
    fn get_by_id(&self, visibility: Visibility, id: GridId) -> StoreResult<Option<GridDocument>>;

    /// Pick a public id uniformly at random.
    ///
    /// Fails with [`StoreError::EmptyPartition`] when no public grids exist.
    ///
    /// [`StoreError::EmptyPartition`]: crate::StoreError::EmptyPartition
    fn random_public_id(&self) -> StoreResult<GridId>;

    /// Number of rows in a partition.
    fn count(&self, visibility: Visibility) -> StoreResult<u64>;
}

/// Uniform index in `0..len`, or `None` when `len == 0`.
pub(crate) fn random_index(len: usize) -> Option<usize> {
    (len > 0).then(|| rand::thread_rng().gen_range(0..len))
}
