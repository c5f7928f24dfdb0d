use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::trace;

use gridshare_types::{GridId, GridToken, Visibility};

use crate::error::{CodecError, CodecResult};
use crate::hashids::Hashids;

/// Minimum token length when none is configured.
pub const DEFAULT_MIN_LENGTH: usize = 6;

/// Number of encoded tokens remembered per codec.
pub const DEFAULT_MEMO_CAPACITY: usize = 1024;

/// Salts and sizing for an [`IdCodec`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub public_salt: String,
    pub secret_salt: String,
    pub min_length: usize,
    /// Entries in the encode memo. 0 disables memoisation.
    pub memo_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            public_salt: "public".into(),
            secret_salt: "secret".into(),
            min_length: DEFAULT_MIN_LENGTH,
            memo_capacity: DEFAULT_MEMO_CAPACITY,
        }
    }
}

impl CodecConfig {
    pub fn new(public_salt: impl Into<String>, secret_salt: impl Into<String>) -> Self {
        Self {
            public_salt: public_salt.into(),
            secret_salt: secret_salt.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> CodecResult<()> {
        if self.public_salt.is_empty() {
            return Err(CodecError::EmptySalt("public"));
        }
        if self.secret_salt.is_empty() {
            return Err(CodecError::EmptySalt("secret"));
        }
        if self.public_salt == self.secret_salt {
            return Err(CodecError::SaltsNotDistinct);
        }
        Ok(())
    }
}

/// Visibility-scoped token codec.
///
/// Holds one [`Hashids`] per partition. The caller always states which
/// partition a token belongs to; the codec never guesses.
pub struct IdCodec {
    public: Hashids,
    secret: Hashids,
    /// `None` when memoisation is disabled.
    memo: Option<Mutex<LruCache<(GridId, Visibility), GridToken>>>,
}

impl IdCodec {
    /// Build a codec. Fails if the salts are empty or identical.
    pub fn new(config: &CodecConfig) -> CodecResult<Self> {
        config.validate()?;
        Ok(Self {
            public: Hashids::new(&config.public_salt, config.min_length)?,
            secret: Hashids::new(&config.secret_salt, config.min_length)?,
            memo: NonZeroUsize::new(config.memo_capacity)
                .map(|capacity| Mutex::new(LruCache::new(capacity))),
        })
    }

    pub fn min_length(&self) -> usize {
        self.public.min_length()
    }

    /// Encode an id for the given partition. Deterministic.
    pub fn encode(&self, id: GridId, visibility: Visibility) -> GridToken {
        let key = (id, visibility);
        // A poisoned memo only costs a recomputation.
        if let Some(Ok(mut memo)) = self.memo.as_ref().map(Mutex::lock) {
            if let Some(token) = memo.get(&key) {
                return token.clone();
            }
        }

        let token = GridToken::new(self.hashids(visibility).encode(&[id.get()]));
        trace!(%id, %visibility, %token, "encoded grid id");

        if let Some(Ok(mut memo)) = self.memo.as_ref().map(Mutex::lock) {
            memo.put(key, token.clone());
        }
        token
    }

    /// Decode a token under the given partition's salt.
    ///
    /// Returns `None` for anything [`encode`](Self::encode) could not have
    /// produced for this partition: wrong alphabet, wrong length, tampered
    /// characters, several numbers, or the id 0.
    pub fn decode(&self, token: &str, visibility: Visibility) -> Option<GridId> {
        if token.chars().count() < self.min_length() {
            return None;
        }
        let raw = self.hashids(visibility).decode_one(token)?;
        GridId::new(raw)
    }

    fn hashids(&self, visibility: Visibility) -> &Hashids {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Secret => &self.secret,
        }
    }
}

impl std::fmt::Debug for IdCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdCodec")
            .field("min_length", &self.min_length())
            .finish_non_exhaustive()
    }
}
