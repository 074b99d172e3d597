//! # Tidemark Core
//!
//! Pure primitives for Tidemark: documents, author identities, and the
//! text codec that binds them together.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Document`] - An immutable, signed record bound to one path
//! - [`DocumentBuilder`] - Assembles and signs documents
//! - [`AuthorAddress`] - Textual identity: `@<shortname>.<base32 pubkey>`
//! - [`AuthorKeypair`] - An author's address plus encoded secret key
//! - [`Keypair`] - The underlying Ed25519 signing keypair
//!
//! ## Encoding
//!
//! All binary values (keys, signatures, content hashes) are written as
//! multibase text: a `'b'` tag followed by lowercase unpadded base32. See
//! [`codec`]. Signatures cover a deterministic CBOR encoding of the
//! document's fields; see [`canonical`].

pub mod canonical;
pub mod codec;
pub mod crypto;
pub mod document;
pub mod error;
pub mod identity;

pub use canonical::signed_message;
pub use crypto::{sha256_base32, Keypair, PublicKey, Signature};
pub use document::{is_valid_path, Document, DocumentBuilder};
pub use error::{CoreError, DecodeError, IdentityError};
pub use identity::{
    author_keypair_from, generate_author_keypair, AuthorAddress, AuthorKeypair,
};
