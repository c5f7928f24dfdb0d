use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use gridshare_types::{GridDocument, GridId, NewGrid, Visibility};

use crate::error::{StoreError, StoreResult};
use crate::traits::{random_index, GridStore};

/// In-memory, `Vec`-backed grid store.
///
/// Intended for tests and embedding. Each partition is a `Vec` behind its
/// own `RwLock`; row `i` holds id `i + 1`. Data is lost when the store is
/// dropped.
pub struct InMemoryGridStore {
    public: RwLock<Vec<GridDocument>>,
    secret: RwLock<Vec<GridDocument>>,
}

impl InMemoryGridStore {
    pub fn new() -> Self {
        Self {
            public: RwLock::new(Vec::new()),
            secret: RwLock::new(Vec::new()),
        }
    }

    fn partition(&self, visibility: Visibility) -> &RwLock<Vec<GridDocument>> {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Secret => &self.secret,
        }
    }
}

impl Default for InMemoryGridStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

impl GridStore for InMemoryGridStore {
    fn insert(&self, grid: &NewGrid) -> StoreResult<GridId> {
        let mut rows = self.partition(grid.visibility).write().map_err(poisoned)?;
        let id = GridId::new(rows.len() as u64 + 1).unwrap_or(GridId::FIRST);
        rows.push(grid.clone().into_document(id, Utc::now()));
        debug!(%id, visibility = %grid.visibility, "grid stored");
        Ok(id)
    }

    fn get_by_id(&self, visibility: Visibility, id: GridId) -> StoreResult<Option<GridDocument>> {
        let rows = self.partition(visibility).read().map_err(poisoned)?;
        Ok(usize::try_from(id.get() - 1)
            .ok()
            .and_then(|index| rows.get(index))
            .cloned())
    }

    fn random_public_id(&self) -> StoreResult<GridId> {
        let rows = self.public.read().map_err(poisoned)?;
        random_index(rows.len())
            .map(|index| rows[index].id)
            .ok_or(StoreError::EmptyPartition(Visibility::Public))
    }

    fn count(&self, visibility: Visibility) -> StoreResult<u64> {
        Ok(self.partition(visibility).read().map_err(poisoned)?.len() as u64)
    }
}

impl std::fmt::Debug for InMemoryGridStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGridStore")
            .field("public", &self.count(Visibility::Public).unwrap_or_default())
            .field("secret", &self.count(Visibility::Secret).unwrap_or_default())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridshare_types::{GridClass, GridData, RuntimeVersion};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn make_grid(visibility: Visibility, marker: u32) -> NewGrid {
        NewGrid {
            visibility,
            library_version: "1.9.0".into(),
            runtime_version: RuntimeVersion::new(vec![
                3.into(),
                11.into(),
                4.into(),
                "final".into(),
                0.into(),
            ]),
            grid_class: GridClass::BlockGrid,
            code_cells: Some(vec![format!("grid[0, 0] = ({marker}, 0, 0)")]),
            grid_data: GridData::new(
                2,
                2,
                true,
                vec![
                    vec![[marker, 2, 3, 4], [5, 6, 7, 8]],
                    vec![[9, 10, 11, 12], [13, 14, 15, 16]],
                ],
            ),
        }
    }

    fn id(raw: u64) -> GridId {
        GridId::new(raw).unwrap()
    }

    #[test]
    fn insert_and_get() {
        let store = InMemoryGridStore::new();
        let grid = make_grid(Visibility::Public, 1);
        let assigned = store.insert(&grid).unwrap();
        assert_eq!(assigned, GridId::FIRST);

        let doc = store.get_by_id(Visibility::Public, assigned).unwrap().unwrap();
        assert_eq!(doc.id, assigned);
        assert_eq!(doc.content(), grid);
    }

    #[test]
    fn ids_are_sequential_per_partition() {
        let store = InMemoryGridStore::new();
        assert_eq!(store.insert(&make_grid(Visibility::Public, 1)).unwrap(), id(1));
        assert_eq!(store.insert(&make_grid(Visibility::Public, 2)).unwrap(), id(2));
        assert_eq!(store.insert(&make_grid(Visibility::Secret, 3)).unwrap(), id(1));
        assert_eq!(store.insert(&make_grid(Visibility::Public, 4)).unwrap(), id(3));
        assert_eq!(store.count(Visibility::Public).unwrap(), 3);
        assert_eq!(store.count(Visibility::Secret).unwrap(), 1);
    }

    #[test]
    fn same_id_in_both_partitions_are_different_rows() {
        let store = InMemoryGridStore::new();
        store.insert(&make_grid(Visibility::Public, 100)).unwrap();
        store.insert(&make_grid(Visibility::Secret, 200)).unwrap();

        let public = store.get_by_id(Visibility::Public, id(1)).unwrap().unwrap();
        let secret = store.get_by_id(Visibility::Secret, id(1)).unwrap().unwrap();
        assert_eq!(public.grid_data.blocks[0][0][0], 100);
        assert_eq!(secret.grid_data.blocks[0][0][0], 200);
        assert_eq!(secret.visibility, Visibility::Secret);
    }

    #[test]
    fn missing_row_is_none() {
        let store = InMemoryGridStore::new();
        assert!(store.get_by_id(Visibility::Public, id(1)).unwrap().is_none());
        store.insert(&make_grid(Visibility::Public, 1)).unwrap();
        assert!(store.get_by_id(Visibility::Public, id(2)).unwrap().is_none());
        assert!(store.get_by_id(Visibility::Secret, id(1)).unwrap().is_none());
        assert!(store.get_by_id(Visibility::Public, id(1)).unwrap().is_some());
    }

    #[test]
    fn huge_id_is_none() {
        let store = InMemoryGridStore::new();
        store.insert(&make_grid(Visibility::Public, 1)).unwrap();
        assert!(store.get_by_id(Visibility::Public, id(u64::MAX)).unwrap().is_none());
        assert!(store.get_by_id(Visibility::Public, id(1 << 32)).unwrap().is_none());
    }

    #[test]
    fn random_on_empty_partition_fails() {
        let store = InMemoryGridStore::new();
        store.insert(&make_grid(Visibility::Secret, 1)).unwrap();
        let err = store.random_public_id().unwrap_err();
        assert!(matches!(err, StoreError::EmptyPartition(Visibility::Public)));
    }

    #[test]
    fn random_covers_every_public_row_and_no_secret_row() {
        let store = InMemoryGridStore::new();
        for n in 0..5 {
            store.insert(&make_grid(Visibility::Public, n)).unwrap();
        }
        for n in 0..20 {
            store.insert(&make_grid(Visibility::Secret, n)).unwrap();
        }

        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            let picked = store.random_public_id().unwrap();
            assert!(picked.get() >= 1 && picked.get() <= 5, "picked {picked}");
            seen.insert(picked);
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn concurrent_inserts_get_unique_ids() {
        let store = Arc::new(InMemoryGridStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|n| store.insert(&make_grid(Visibility::Public, t * 100 + n)).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for h in handles {
            for assigned in h.join().expect("thread should not panic") {
                assert!(ids.insert(assigned), "duplicate id {assigned}");
            }
        }
        assert_eq!(ids.len(), 200);
        assert_eq!(store.count(Visibility::Public).unwrap(), 200);
        // Dense: every id in 1..=200 was assigned.
        assert!((1..=200).all(|raw| ids.contains(&id(raw))));
    }

    #[test]
    fn debug_format() {
        let store = InMemoryGridStore::new();
        store.insert(&make_grid(Visibility::Public, 1)).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryGridStore"));
        assert!(debug.contains("public: 1"));
    }
}
