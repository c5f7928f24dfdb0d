//! Token codec for gridshare.
//!
//! Turns partition-local integer ids into short, non-sequential tokens and
//! back. The scheme is Hashids-compatible: a salted consistent shuffle of
//! the alphabet, a lottery character, separators between numbers and guard
//! padding up to a minimum length.
//!
//! [`IdCodec`] holds one [`Hashids`] instance per [`Visibility`] with
//! distinct salts, so a token issued for one partition does not decode to
//! the same id in the other.
//!
//! [`Visibility`]: gridshare_types::Visibility

pub mod codec;
pub mod error;
pub mod hashids;

pub use codec::{CodecConfig, IdCodec, DEFAULT_MEMO_CAPACITY, DEFAULT_MIN_LENGTH};
pub use error::{CodecError, CodecResult};
pub use hashids::{Hashids, DEFAULT_ALPHABET};
