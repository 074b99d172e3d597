//! DocumentStore: the abstract interface for document indexes.
//!
//! This trait allows the ingestion pipeline to be index-agnostic. The
//! in-memory implementation is [`crate::MemoryStore`].

use tidemark_core::Document;

use crate::error::Result;
use crate::query::Query;

/// Options for closing a store.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloseOptions {
    /// Also erase retained external resources. The in-memory store drops
    /// its contents either way; backends with external state honor this.
    pub erase: bool,
}

/// Synchronous interface to a document index.
///
/// Every operation runs to completion before returning; callers serialize
/// mutating operations against each other and against reads. Once
/// [`close`](DocumentStore::close) has run, every method fails fast with
/// [`StoreError::Closed`](crate::StoreError::Closed).
///
/// # Design Notes
///
/// - **Upsert trusts its caller**: documents arrive already validated and
///   signature-verified by the ingestion pipeline; upsert performs no
///   semantic checks of its own.
/// - **Stored documents are frozen**: any transformation produces a new
///   `Document` value and re-upserts it.
/// - **Reads are not restartable**: each call recomputes from current
///   contents.
pub trait DocumentStore {
    /// Query documents. The result is sorted path ascending, author
    /// ascending, after per-path conflict resolution, filtering, and
    /// limit truncation.
    fn read(&self, query: &Query) -> Result<Vec<Document>>;

    /// Store `doc` as the authoritative version for (path, author),
    /// replacing any prior document from that author at that path.
    fn upsert(&self, doc: Document) -> Result<()>;

    /// Permanently delete every document matching the query. The query's
    /// history mode must resolve to `All`; returns the number removed.
    fn forget(&self, query: &Query) -> Result<usize>;

    /// Remove every document expired at `now` (microseconds); returns the
    /// number removed.
    fn discard_expired(&self, now: u64) -> Result<usize>;

    /// Release contents. Terminal: the store is unusable afterwards.
    fn close(&self, options: CloseOptions) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────
    // Config: flat string key/value metadata, independent of documents
    // ─────────────────────────────────────────────────────────────────────

    /// Set a config value.
    fn set_config(&self, key: &str, value: &str) -> Result<()>;

    /// Get a config value, if set.
    fn get_config(&self, key: &str) -> Result<Option<String>>;

    /// Delete a config value; returns whether it existed.
    fn delete_config(&self, key: &str) -> Result<bool>;

    /// Delete all config values.
    fn delete_all_config(&self) -> Result<()>;
}
