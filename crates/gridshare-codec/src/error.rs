/// Errors raised while building a codec. Encoding and decoding never fail
/// with an error: decoding reports bad input as `None`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// Fewer than 16 unique characters in the alphabet.
    #[error("alphabet must contain at least {min} unique characters, got {actual}")]
    AlphabetTooShort { min: usize, actual: usize },

    /// The alphabet contains a space.
    #[error("alphabet must not contain spaces")]
    AlphabetHasSpace,

    /// The public and secret salts are identical.
    #[error("public and secret salts must differ")]
    SaltsNotDistinct,

    /// A salt is empty.
    #[error("{0} salt must not be empty")]
    EmptySalt(&'static str),
}

/// Result alias for codec construction.
pub type CodecResult<T> = Result<T, CodecError>;
