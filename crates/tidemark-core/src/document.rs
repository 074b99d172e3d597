//! Document: the atomic unit of the store.
//!
//! A document binds one path to one author's content and is self-verifying
//! via an Ed25519 signature over the canonical encoding of its fields.
//! Once stored, a document never changes; an edit is a new document value
//! that replaces the old one at the same (path, author) slot.

use serde::{Deserialize, Serialize};

use crate::canonical::signed_message;
use crate::crypto::sha256_base32;
use crate::error::CoreError;
use crate::identity::{self, AuthorAddress, AuthorKeypair};

/// An immutable, signed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Address of the author identity that signed this document.
    pub author: AuthorAddress,
    /// Slash-delimited path the document is bound to.
    pub path: String,
    /// Text-safe payload.
    pub content: String,
    /// SHA-256 of the content, as tagged base32.
    pub content_hash: String,
    /// Author-claimed write time, microseconds since epoch.
    pub timestamp: u64,
    /// Optional expiry, microseconds since epoch. Past it the document is
    /// excluded from reads and eventually purged.
    pub delete_after: Option<u64>,
    /// Signature over the canonical field encoding, as tagged base32.
    pub signature: String,
}

impl Document {
    /// Byte length of the content (UTF-8 bytes, not characters).
    pub fn content_length(&self) -> usize {
        self.content.len()
    }

    /// Check that the content hash matches the content and the signature
    /// is authentic for the author named in the document.
    ///
    /// All failure modes collapse to `false`.
    pub fn verify(&self) -> bool {
        if self.content_hash != sha256_base32(&self.content) {
            return false;
        }
        identity::verify(self.author.as_str(), &self.signature, self.to_signed_message())
    }

    /// The canonical message this document's signature covers.
    fn to_signed_message(&self) -> Vec<u8> {
        signed_message(
            self.author.as_str(),
            &self.path,
            &self.content_hash,
            self.timestamp,
            self.delete_after,
        )
    }
}

/// Check a document path: non-empty, slash-led, no whitespace.
///
/// Full path schema rules live in the ingestion pipeline; this is the
/// floor below which a path cannot be addressed at all.
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty() && path.starts_with('/') && !path.chars().any(char::is_whitespace)
}

/// Builder for signed documents.
pub struct DocumentBuilder {
    path: String,
    content: String,
    timestamp: u64,
    delete_after: Option<u64>,
}

impl DocumentBuilder {
    /// Start building a document at the given path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: String::new(),
            timestamp: 0,
            delete_after: None,
        }
    }

    /// Set the content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the timestamp (microseconds since epoch).
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Make the document ephemeral, expiring at `at` microseconds.
    pub fn delete_after(mut self, at: u64) -> Self {
        self.delete_after = Some(at);
        self
    }

    /// Hash the content, canonically encode the fields, and sign them.
    pub fn sign(self, author: &AuthorKeypair) -> Result<Document, CoreError> {
        if !is_valid_path(&self.path) {
            return Err(CoreError::InvalidPath(self.path));
        }
        let content_hash = sha256_base32(&self.content);
        let message = signed_message(
            author.address.as_str(),
            &self.path,
            &content_hash,
            self.timestamp,
            self.delete_after,
        );
        let signature = author.sign(message)?;

        Ok(Document {
            author: author.address.clone(),
            path: self.path,
            content: self.content,
            content_hash,
            timestamp: self.timestamp,
            delete_after: self.delete_after,
            signature,
        })
    }
}
