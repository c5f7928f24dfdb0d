use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gridshare_cache::{CacheKey, CacheStats, DisabledCache, InMemoryLookupCache, LookupCache};
use gridshare_codec::IdCodec;
use gridshare_store::{GridStore, InMemoryGridStore, LogGridStore, StoreError};
use gridshare_types::{GridDocument, GridSubmission, GridToken, NewGrid, Visibility};

use crate::config::{GridshareConfig, StoreBackend};
use crate::error::{RepoError, RepoResult};

/// Row counts and cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    pub public_grids: u64,
    pub secret_grids: u64,
    pub cache: Option<CacheStats>,
}

/// Store, look up and sample grids by token.
pub struct GridRepository {
    store: Arc<dyn GridStore>,
    cache: Arc<dyn LookupCache>,
    codec: IdCodec,
}

impl GridRepository {
    pub fn new(store: Arc<dyn GridStore>, cache: Arc<dyn LookupCache>, codec: IdCodec) -> Self {
        Self {
            store,
            cache,
            codec,
        }
    }

    /// Build every component from configuration.
    pub fn from_config(config: &GridshareConfig) -> RepoResult<Self> {
        let codec = IdCodec::new(&config.codec)?;
        let store: Arc<dyn GridStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(InMemoryGridStore::new()),
            StoreBackend::Log => {
                Arc::new(LogGridStore::open(&config.store.data_dir, config.store.sync)?)
            }
        };
        let cache: Arc<dyn LookupCache> = if config.cache.enabled {
            Arc::new(InMemoryLookupCache::new(config.cache.capacity))
        } else {
            Arc::new(DisabledCache)
        };
        info!(
            backend = ?config.store.backend,
            cache = config.cache.enabled,
            min_length = codec.min_length(),
            "grid repository ready"
        );
        Ok(Self::new(store, cache, codec))
    }

    pub fn codec(&self) -> &IdCodec {
        &self.codec
    }

    /// Persist a grid and return its token.
    ///
    /// The cache is left cold; the first read goes to storage.
    pub fn store(&self, grid: &NewGrid) -> RepoResult<GridToken> {
        let id = self.store.insert(grid)?;
        let token = self.codec.encode(id, grid.visibility);
        debug!(%id, visibility = %grid.visibility, %token, "grid stored");
        Ok(token)
    }

    /// Validate a client payload, then [`store`](Self::store) it.
    pub fn store_submission(
        &self,
        submission: GridSubmission,
    ) -> RepoResult<(Visibility, GridToken)> {
        submission.validate()?;
        let grid = submission.into_new_grid();
        let token = self.store(&grid)?;
        Ok((grid.visibility, token))
    }

    /// Resolve a token within one partition.
    ///
    /// Returns `Ok(None)` when the token does not decode or no row matches.
    /// Cache failures are logged and treated as misses.
    pub fn fetch(&self, token: &str, visibility: Visibility) -> RepoResult<Option<GridDocument>> {
        let Some(id) = self.codec.decode(token, visibility) else {
            debug!(token, %visibility, "token does not decode");
            return Ok(None);
        };
        let key = CacheKey::new(id, visibility);

        match self.cache.get(&key) {
            Ok(Some(document)) => return Ok(Some(document)),
            Ok(None) => {}
            Err(e) => warn!(%key, error = %e, "cache lookup failed; reading from store"),
        }

        let Some(document) = self.store.get_by_id(visibility, id)? else {
            debug!(%id, %visibility, "grid not found");
            return Ok(None);
        };
        if let Err(e) = self.cache.put(key, document.clone()) {
            warn!(%key, error = %e, "cache fill failed");
        }
        Ok(Some(document))
    }

    /// Pick a public grid uniformly at random.
    ///
    /// Goes through [`fetch`](Self::fetch) so the result is exactly what a
    /// direct lookup of the returned token would give.
    pub fn fetch_random_public(&self) -> RepoResult<(GridToken, GridDocument)> {
        let id = self.store.random_public_id().map_err(|e| match e {
            StoreError::EmptyPartition(_) => RepoError::NoPublicGrids,
            other => RepoError::Store(other),
        })?;
        let token = self.codec.encode(id, Visibility::Public);
        let document = self
            .fetch(token.as_str(), Visibility::Public)?
            .ok_or(RepoError::Inconsistent {
                visibility: Visibility::Public,
                id,
            })?;
        Ok((token, document))
    }

    pub fn stats(&self) -> RepoResult<RepoStats> {
        Ok(RepoStats {
            public_grids: self.store.count(Visibility::Public)?,
            secret_grids: self.store.count(Visibility::Secret)?,
            cache: self.cache.stats(),
        })
    }
}

impl std::fmt::Debug for GridRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridRepository")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
