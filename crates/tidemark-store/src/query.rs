//! Query engine: pure filter and ordering functions over documents.
//!
//! Nothing here touches the index. [`crate::MemoryStore`] delegates to
//! these functions so the "which document wins" logic stays a total,
//! deterministic order shared by every peer holding the same documents.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use tidemark_core::{AuthorAddress, Document};

/// Whether a read returns only each path's winning document or every
/// author's version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryMode {
    /// One document per path: the winner of conflict resolution.
    Latest,
    /// Every author's version of every matching path.
    All,
}

/// Pagination cursor: only documents strictly after `(path, author)` in
/// presentation order match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub path: String,
    pub author: AuthorAddress,
}

/// A filter/sort/limit specification over documents.
///
/// Unset fields impose no constraint. Timestamp bounds are microseconds;
/// content-length bounds and `limit_bytes` are UTF-8 bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Exact path.
    pub path: Option<String>,
    /// Path prefix.
    pub path_starts_with: Option<String>,
    /// Exact author.
    pub author: Option<AuthorAddress>,
    /// Inclusive lower timestamp bound.
    pub timestamp_gte: Option<u64>,
    /// Inclusive upper timestamp bound.
    pub timestamp_lte: Option<u64>,
    /// Inclusive lower content-length bound.
    pub content_length_gte: Option<usize>,
    /// Inclusive upper content-length bound.
    pub content_length_lte: Option<usize>,
    /// Resume strictly after this (path, author).
    pub continue_after: Option<Cursor>,
    /// Latest-only or full history. Unset means `All` after normalization.
    pub history: Option<HistoryMode>,
    /// Maximum number of documents.
    pub limit: Option<usize>,
    /// Maximum cumulative content bytes.
    pub limit_bytes: Option<usize>,
}

impl Query {
    /// Fill defaults. Idempotent: normalizing a normalized query yields
    /// the same query.
    pub fn normalize(mut self) -> Self {
        if self.history.is_none() {
            self.history = Some(HistoryMode::All);
        }
        self
    }

    /// The effective history mode (`All` when unset).
    pub fn history_mode(&self) -> HistoryMode {
        self.history.unwrap_or(HistoryMode::All)
    }

    /// Conjunction of every set predicate; unset predicates pass.
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(path) = &self.path {
            if doc.path != *path {
                return false;
            }
        }
        if let Some(prefix) = &self.path_starts_with {
            if !doc.path.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if doc.author != *author {
                return false;
            }
        }
        if let Some(at) = self.timestamp_gte {
            if doc.timestamp < at {
                return false;
            }
        }
        if let Some(at) = self.timestamp_lte {
            if doc.timestamp > at {
                return false;
            }
        }
        if let Some(len) = self.content_length_gte {
            if doc.content_length() < len {
                return false;
            }
        }
        if let Some(len) = self.content_length_lte {
            if doc.content_length() > len {
                return false;
            }
        }
        if let Some(cursor) = &self.continue_after {
            if (doc.path.as_str(), &doc.author) <= (cursor.path.as_str(), &cursor.author) {
                return false;
            }
        }
        true
    }
}

/// True iff the document has expired at `now` (microseconds).
///
/// A document expires strictly after its `delete_after` instant.
pub fn is_expired(doc: &Document, now: u64) -> bool {
    matches!(doc.delete_after, Some(at) if now > at)
}

/// Conflict-resolution order: newest first, ties broken by signature
/// text descending.
///
/// This is a total order over distinct documents, so independent peers
/// holding the same set always pick the same winner even when timestamps
/// collide.
pub fn latest_first(a: &Document, b: &Document) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| b.signature.cmp(&a.signature))
}

/// Presentation order: path ascending, then author ascending.
pub fn path_asc_author_asc(a: &Document, b: &Document) -> Ordering {
    a.path
        .cmp(&b.path)
        .then_with(|| a.author.cmp(&b.author))
}
