//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a signing identity plus a
//! fresh in-memory store.

use std::sync::Arc;

use tidemark_core::{
    author_keypair_from, AuthorAddress, AuthorKeypair, Document, DocumentBuilder, Keypair,
};
use tidemark_store::MemoryStore;

/// A test fixture with an author identity and an in-memory store.
pub struct TestFixture {
    pub keypair: Keypair,
    pub author: AuthorKeypair,
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create a fixture with a random keypair and shortname `"test"`.
    pub fn new() -> Self {
        Self::from_keypair("test", Keypair::generate())
    }

    /// Create a fixture with a deterministic keypair from a seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_keypair("test", Keypair::from_seed(&seed))
    }

    /// Create a fixture with an explicit shortname and seed.
    pub fn with_shortname(shortname: &str, seed: [u8; 32]) -> Self {
        Self::from_keypair(shortname, Keypair::from_seed(&seed))
    }

    fn from_keypair(shortname: &str, keypair: Keypair) -> Self {
        let author = author_keypair_from(shortname, &keypair)
            .expect("fixture shortname must be valid");
        Self {
            keypair,
            author,
            store: MemoryStore::new(),
        }
    }

    /// Replace the store with one using a fixed clock, for deterministic
    /// expiration checks.
    pub fn at_time(mut self, now: u64) -> Self {
        self.store = MemoryStore::with_clock(Arc::new(move || now));
        self
    }

    /// This fixture's author address.
    pub fn address(&self) -> &AuthorAddress {
        &self.author.address
    }

    /// Build and sign a document.
    pub fn make_doc(&self, path: &str, content: &str, timestamp: u64) -> Document {
        DocumentBuilder::new(path)
            .content(content)
            .timestamp(timestamp)
            .sign(&self.author)
            .expect("fixture document must sign")
    }

    /// Build and sign an ephemeral document.
    pub fn make_ephemeral(
        &self,
        path: &str,
        content: &str,
        timestamp: u64,
        delete_after: u64,
    ) -> Document {
        DocumentBuilder::new(path)
            .content(content)
            .timestamp(timestamp)
            .delete_after(delete_after)
            .sign(&self.author)
            .expect("fixture document must sign")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures with distinct seeded identities, for
/// multi-author tests. Shortnames run `auta`, `autb`, ...
pub fn multi_author_fixtures(count: usize) -> Vec<TestFixture> {
    assert!(count <= 26, "only 26 distinct shortnames available");
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8 + 1;
            let shortname = format!("aut{}", (b'a' + i as u8) as char);
            TestFixture::with_shortname(&shortname, seed)
        })
        .collect()
}
