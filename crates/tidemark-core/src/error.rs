//! Error types for Tidemark Core.

use thiserror::Error;

/// Errors from the multibase base32 codec.
///
/// Every variant names the exact defect so callers can tell a wrong tag
/// from a corrupt body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,

    #[error("wrong format tag: expected 'b', found {0:?}")]
    WrongTag(char),

    #[error("invalid base32 character {ch:?} at position {pos}")]
    InvalidCharacter { ch: char, pos: usize },

    #[error("input length leaves a partial byte")]
    PartialByte,

    #[error("nonzero trailing padding bits")]
    TrailingBits,
}

/// Validation errors for author identities and keypairs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("shortname must be exactly 4 characters, got {0}")]
    ShortnameLength(usize),

    #[error("shortname must be lowercase: {0:?}")]
    ShortnameNotLowercase(String),

    #[error("shortname may only contain ascii letters a-z, found {0:?}")]
    ShortnameInvalidCharacter(char),

    #[error("author address must start with '@'")]
    MissingAddressSigil,

    #[error("author address must be '@<shortname>.<pubkey>': {0:?}")]
    MalformedAddress(String),

    #[error("empty secret")]
    EmptySecret,

    #[error("decoded key has wrong length: expected {expected} bytes, got {got}")]
    KeyLength { expected: usize, got: usize },

    #[error("decoded signature has wrong length: expected 64 bytes, got {0}")]
    SignatureLength(usize),

    #[error("secret does not derive the public key named in the address")]
    KeyMismatch,

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors from document construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid document path {0:?}")]
    InvalidPath(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
