//! Layered configuration.
//!
//! Values come from compiled defaults, then an optional TOML file, then
//! `GRIDSHARE_*` environment variables. The result is read once at startup
//! and handed to constructors; nothing below this module reads the
//! environment.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use gridshare_cache::DEFAULT_CAPACITY;
use gridshare_codec::CodecConfig;
use gridshare_store::SyncMode;

use crate::error::{RepoError, RepoResult};

pub const ENV_PUBLIC_SALT: &str = "GRIDSHARE_PUBLIC_SALT";
pub const ENV_SECRET_SALT: &str = "GRIDSHARE_SECRET_SALT";
pub const ENV_DATA_DIR: &str = "GRIDSHARE_DATA_DIR";
pub const ENV_BIND: &str = "GRIDSHARE_BIND";
pub const ENV_CACHE_CAPACITY: &str = "GRIDSHARE_CACHE_CAPACITY";

/// Which [`GridStore`](gridshare_store::GridStore) to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Log,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory for log files. Ignored by the memory backend.
    pub data_dir: PathBuf,
    pub sync: SyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            data_dir: PathBuf::from("gridshare-data"),
            sync: SyncMode::EveryWrite,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Maximum cached documents.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Prefix for URLs returned by `POST /post`, without a trailing slash.
    pub public_base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            public_base_url: "http://127.0.0.1:8080".into(),
            request_timeout_ms: 5_000,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Top-level configuration, one section per component.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridshareConfig {
    pub codec: CodecConfig,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
}

impl GridshareConfig {
    pub fn from_toml_str(text: &str) -> RepoResult<Self> {
        toml::from_str(text).map_err(|e| RepoError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> RepoResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RepoError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> RepoResult<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides(std::env::vars())
    }

    /// Apply `GRIDSHARE_*` overrides from an explicit variable list.
    pub fn with_env_overrides<I>(mut self, vars: I) -> RepoResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                ENV_PUBLIC_SALT => self.codec.public_salt = value,
                ENV_SECRET_SALT => self.codec.secret_salt = value,
                ENV_DATA_DIR => {
                    self.store.data_dir = PathBuf::from(value);
                    self.store.backend = StoreBackend::Log;
                }
                ENV_BIND => {
                    self.server.bind_addr = value.parse().map_err(|e| {
                        RepoError::Config(format!("{ENV_BIND}={value:?}: {e}"))
                    })?;
                }
                ENV_CACHE_CAPACITY => {
                    self.cache.capacity = value.parse().map_err(|e| {
                        RepoError::Config(format!("{ENV_CACHE_CAPACITY}={value:?}: {e}"))
                    })?;
                }
                _ => {}
            }
        }
        Ok(self)
    }

    pub fn to_toml_string(&self) -> RepoResult<String> {
        toml::to_string_pretty(self).map_err(|e| RepoError::Config(e.to_string()))
    }
}
