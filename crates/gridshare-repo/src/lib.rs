//! Grid repository for gridshare.
//!
//! [`GridRepository`] is the single entry point used by the HTTP layer and
//! the CLI. It combines a [`GridStore`], a [`LookupCache`] and an
//! [`IdCodec`] into three operations:
//!
//! - `store` -- persist a grid and hand back its token
//! - `fetch` -- resolve a token within an explicit partition
//! - `fetch_random_public` -- pick any public grid
//!
//! Reads are two-phase: decode the token, then consult the cache and fall
//! back to storage. A token that does not decode never reaches either.
//!
//! [`GridStore`]: gridshare_store::GridStore
//! [`LookupCache`]: gridshare_cache::LookupCache
//! [`IdCodec`]: gridshare_codec::IdCodec

pub mod config;
pub mod error;
pub mod repository;

pub use config::{CacheConfig, GridshareConfig, ServerConfig, StoreBackend, StoreConfig};
pub use error::{RepoError, RepoResult};
pub use repository::{GridRepository, RepoStats};
