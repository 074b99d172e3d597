//! # Tidemark Store
//!
//! The document index and query engine: for every path, one document per
//! author, with deterministic conflict resolution so that independent
//! peers holding the same documents agree on which version is current.
//!
//! ## Key Types
//!
//! - [`DocumentStore`] - The interface for all index operations
//! - [`MemoryStore`] - The in-memory index implementation
//! - [`Query`] - Filter/sort/limit specification for reads and forgets
//! - [`HistoryMode`] - Latest-only winners vs. every author's version
//!
//! ## Usage
//!
//! ```rust
//! use tidemark_core::{generate_author_keypair, DocumentBuilder};
//! use tidemark_store::{DocumentStore, HistoryMode, MemoryStore, Query};
//!
//! let author = generate_author_keypair("gull").unwrap();
//! let doc = DocumentBuilder::new("/wiki/tides")
//!     .content("spring tide tonight")
//!     .timestamp(1_736_870_400_000_000)
//!     .sign(&author)
//!     .unwrap();
//!
//! let store = MemoryStore::new();
//! store.upsert(doc).unwrap();
//!
//! let query = Query {
//!     history: Some(HistoryMode::Latest),
//!     ..Query::default()
//! };
//! let docs = store.read(&query).unwrap();
//! assert_eq!(docs.len(), 1);
//! ```
//!
//! ## Design Notes
//!
//! - **Deterministic winners**: conflict resolution is a total order
//!   (timestamp descending, then signature text descending), never a
//!   partial one.
//! - **Frozen documents**: the index never mutates a stored document;
//!   replacement happens only through `upsert`.
//! - **Terminal close**: after `close`, every operation fails fast with
//!   [`StoreError::Closed`].

pub mod error;
pub mod memory;
pub mod query;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{Clock, MemoryStore};
pub use query::{is_expired, latest_first, path_asc_author_asc, Cursor, HistoryMode, Query};
pub use traits::{CloseOptions, DocumentStore};
