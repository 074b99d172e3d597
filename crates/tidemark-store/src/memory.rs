//! In-memory implementation of [`DocumentStore`].
//!
//! Documents live in a two-level map: path → author → document. This
//! gives O(1) access to all versions of one path and keeps per-path
//! conflict resolution from touching unrelated paths. Thread-safe via
//! `RwLock`; stored documents are never mutated in place.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use tidemark_core::{AuthorAddress, Document};

use crate::error::{Result, StoreError};
use crate::query::{self, HistoryMode, Query};
use crate::traits::{CloseOptions, DocumentStore};

/// Microsecond clock used for expiration checks during reads.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// In-memory document index.
///
/// All data is lost when the store is dropped or closed.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    clock: Clock,
}

struct Inner {
    /// path → author → document.
    docs: BTreeMap<String, BTreeMap<AuthorAddress, Document>>,

    /// Flat per-store settings, independent of documents.
    config: HashMap<String, String>,

    /// Set by `close`; terminal.
    closed: bool,
}

impl Inner {
    fn check_open(&self) -> Result<()> {
        if self.closed {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    /// Remove every document satisfying `doomed`, dropping path entries
    /// that end up empty. Keys are collected first so nothing is deleted
    /// out from under the iteration.
    fn remove_matching(&mut self, doomed: impl Fn(&Document) -> bool) -> usize {
        let mut keys: Vec<(String, AuthorAddress)> = Vec::new();
        for (path, versions) in &self.docs {
            for (author, doc) in versions {
                if doomed(doc) {
                    keys.push((path.clone(), author.clone()));
                }
            }
        }

        for (path, author) in &keys {
            if let Some(versions) = self.docs.get_mut(path) {
                versions.remove(author);
                if versions.is_empty() {
                    self.docs.remove(path);
                }
            }
        }

        keys.len()
    }
}

impl MemoryStore {
    /// Create a new empty store using the wall clock for expiration.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(now_micros))
    }

    /// Create a new empty store with an explicit clock, for deterministic
    /// expiration in tests.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            inner: RwLock::new(Inner {
                docs: BTreeMap::new(),
                config: HashMap::new(),
                closed: false,
            }),
            clock,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, query: &Query) -> Result<Vec<Document>> {
        let inner = self.inner.read().unwrap();
        inner.check_open()?;

        let query = query.clone().normalize();

        // A zero budget can never admit a document.
        if query.limit == Some(0) || query.limit_bytes == Some(0) {
            return Ok(Vec::new());
        }

        let now = (self.clock)();

        // Candidate paths, in ascending order. BTreeMap iteration is
        // sorted, which the prefix stop and the limit early-exit below
        // rely on.
        let paths: Box<dyn Iterator<Item = (&String, &BTreeMap<AuthorAddress, Document>)> + '_> =
            if let Some(path) = &query.path {
                match inner.docs.get_key_value(path) {
                    Some(entry) => Box::new(std::iter::once(entry)),
                    None => return Ok(Vec::new()),
                }
            } else if let Some(prefix) = &query.path_starts_with {
                // Paths lexicographically before the prefix cannot match.
                Box::new(
                    inner
                        .docs
                        .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded)),
                )
            } else {
                Box::new(inner.docs.iter())
            };

        let mut results: Vec<Document> = Vec::new();

        'paths: for (path, versions) in paths {
            if let Some(prefix) = &query.path_starts_with {
                if !path.starts_with(prefix.as_str()) {
                    // Sorted traversal: nothing after this path matches.
                    break;
                }
            }

            // Conflict resolution first, filtering second: in Latest mode
            // a path whose winning version is filtered out contributes
            // nothing, rather than falling back to an older version.
            let retained: Vec<&Document> = match query.history_mode() {
                HistoryMode::Latest => versions
                    .values()
                    .min_by(|a, b| query::latest_first(a, b))
                    .into_iter()
                    .collect(),
                HistoryMode::All => versions.values().collect(),
            };

            for doc in retained {
                if query::is_expired(doc, now) || !query.matches(doc) {
                    continue;
                }
                results.push(doc.clone());
                if let Some(limit) = query.limit {
                    if results.len() >= limit {
                        // Sorted traversal: every later path sorts after
                        // everything collected so far, so it could only
                        // be truncated away again.
                        break 'paths;
                    }
                }
            }
        }

        // Unconditional final sort in presentation order; output never
        // depends on the scan order above.
        results.sort_by(query::path_asc_author_asc);

        if let Some(limit) = query.limit {
            results.truncate(limit);
        }

        if let Some(budget) = query.limit_bytes {
            let mut total = 0usize;
            let mut keep = 0usize;
            for doc in &results {
                let len = doc.content_length();
                // Stop once the budget is exactly consumed, which also
                // excludes a zero-length document landing on the boundary.
                if total >= budget || total + len > budget {
                    break;
                }
                total += len;
                keep += 1;
            }
            results.truncate(keep);
        }

        trace!(returned = results.len(), "read");
        Ok(results)
    }

    fn upsert(&self, doc: Document) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.check_open()?;

        debug!(path = %doc.path, author = %doc.author, timestamp = doc.timestamp, "upsert");
        inner
            .docs
            .entry(doc.path.clone())
            .or_default()
            .insert(doc.author.clone(), doc);
        Ok(())
    }

    fn forget(&self, query: &Query) -> Result<usize> {
        let mut inner = self.inner.write().unwrap();
        inner.check_open()?;

        let query = query.clone().normalize();
        if query.history_mode() != HistoryMode::All {
            return Err(StoreError::ForgetRequiresAllHistories);
        }

        let removed = inner.remove_matching(|doc| query.matches(doc));
        debug!(removed, "forget");
        Ok(removed)
    }

    fn discard_expired(&self, now: u64) -> Result<usize> {
        let mut inner = self.inner.write().unwrap();
        inner.check_open()?;

        let removed = inner.remove_matching(|doc| query::is_expired(doc, now));
        debug!(removed, now, "discard_expired");
        Ok(removed)
    }

    fn close(&self, options: CloseOptions) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.check_open()?;

        debug!(erase = options.erase, "close");
        inner.docs.clear();
        inner.config.clear();
        inner.closed = true;
        Ok(())
    }

    fn set_config(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.check_open()?;
        inner.config.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_config(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.read().unwrap();
        inner.check_open()?;
        Ok(inner.config.get(key).cloned())
    }

    fn delete_config(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        inner.check_open()?;
        Ok(inner.config.remove(key).is_some())
    }

    fn delete_all_config(&self) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.check_open()?;
        inner.config.clear();
        Ok(())
    }
}

/// Current wall-clock time in microseconds.
fn now_micros() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidemark_core::{sha256_base32, PublicKey};

    fn author(shortname: &str, seed: u8) -> AuthorAddress {
        AuthorAddress::from_parts(shortname, &PublicKey::from_bytes([seed; 32])).unwrap()
    }

    fn doc(path: &str, author: &AuthorAddress, timestamp: u64, content: &str) -> Document {
        Document {
            author: author.clone(),
            path: path.to_string(),
            content: content.to_string(),
            content_hash: sha256_base32(content),
            timestamp,
            delete_after: None,
            signature: format!("bsig{}{}", timestamp, author.shortname()),
        }
    }

    fn read_all(store: &MemoryStore) -> Vec<Document> {
        store.read(&Query::default()).unwrap()
    }

    #[test]
    fn test_upsert_and_read() {
        let store = MemoryStore::new();
        let alfa = author("alfa", 1);

        store.upsert(doc("/a", &alfa, 100, "one")).unwrap();
        store.upsert(doc("/b", &alfa, 200, "two")).unwrap();

        let docs = read_all(&store);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].path, "/a");
        assert_eq!(docs[1].path, "/b");
    }

    #[test]
    fn test_upsert_replaces_same_path_and_author() {
        let store = MemoryStore::new();
        let alfa = author("alfa", 1);

        store.upsert(doc("/a", &alfa, 100, "old")).unwrap();
        store.upsert(doc("/a", &alfa, 200, "new")).unwrap();

        let docs = read_all(&store);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "new");
    }

    #[test]
    fn test_read_is_sorted_path_then_author() {
        let store = MemoryStore::new();
        let alfa = author("alfa", 1);
        let beta = author("beta", 2);

        store.upsert(doc("/b", &alfa, 1, "x")).unwrap();
        store.upsert(doc("/a", &beta, 2, "x")).unwrap();
        store.upsert(doc("/a", &alfa, 3, "x")).unwrap();

        let keys: Vec<(String, String)> = read_all(&store)
            .into_iter()
            .map(|d| (d.path, d.author.shortname().to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("/a".to_string(), "alfa".to_string()),
                ("/a".to_string(), "beta".to_string()),
                ("/b".to_string(), "alfa".to_string()),
            ]
        );
    }

    #[test]
    fn test_exact_path_query() {
        let store = MemoryStore::new();
        let alfa = author("alfa", 1);
        store.upsert(doc("/a", &alfa, 1, "x")).unwrap();

        let mut q = Query::default();
        q.path = Some("/a".to_string());
        assert_eq!(store.read(&q).unwrap().len(), 1);

        q.path = Some("/missing".to_string());
        assert!(store.read(&q).unwrap().is_empty());
    }

    #[test]
    fn test_forget_requires_all_history() {
        let store = MemoryStore::new();
        let alfa = author("alfa", 1);
        store.upsert(doc("/a", &alfa, 1, "x")).unwrap();

        let mut q = Query::default();
        q.history = Some(HistoryMode::Latest);
        assert_eq!(
            store.forget(&q),
            Err(StoreError::ForgetRequiresAllHistories)
        );
        // Nothing was deleted.
        assert_eq!(read_all(&store).len(), 1);

        // Unset history normalizes to All and proceeds.
        let q = Query {
            path: Some("/a".to_string()),
            ..Query::default()
        };
        assert_eq!(store.forget(&q).unwrap(), 1);
        assert!(read_all(&store).is_empty());
    }

    #[test]
    fn test_forget_drops_empty_path_entries() {
        let store = MemoryStore::new();
        let alfa = author("alfa", 1);
        let beta = author("beta", 2);

        store.upsert(doc("/a", &alfa, 1, "x")).unwrap();
        store.upsert(doc("/a", &beta, 2, "x")).unwrap();

        let q = Query {
            author: Some(alfa.clone()),
            ..Query::default()
        };
        assert_eq!(store.forget(&q).unwrap(), 1);
        assert_eq!(read_all(&store).len(), 1);

        let q = Query {
            author: Some(beta.clone()),
            ..Query::default()
        };
        assert_eq!(store.forget(&q).unwrap(), 1);
        assert!(read_all(&store).is_empty());

        // The path slot is genuinely gone; a fresh upsert recreates it.
        store.upsert(doc("/a", &alfa, 3, "x")).unwrap();
        assert_eq!(read_all(&store).len(), 1);
    }

    #[test]
    fn test_closed_store_fails_fast() {
        let store = MemoryStore::new();
        let alfa = author("alfa", 1);
        store.upsert(doc("/a", &alfa, 1, "x")).unwrap();
        store.set_config("k", "v").unwrap();

        store.close(CloseOptions::default()).unwrap();

        assert_eq!(store.read(&Query::default()), Err(StoreError::Closed));
        assert_eq!(store.upsert(doc("/b", &alfa, 2, "x")), Err(StoreError::Closed));
        assert_eq!(store.forget(&Query::default()), Err(StoreError::Closed));
        assert_eq!(store.discard_expired(0), Err(StoreError::Closed));
        assert_eq!(store.set_config("k", "v"), Err(StoreError::Closed));
        assert_eq!(store.get_config("k"), Err(StoreError::Closed));
        assert_eq!(store.delete_config("k"), Err(StoreError::Closed));
        assert_eq!(store.delete_all_config(), Err(StoreError::Closed));
        // Closing is terminal, not repeatable.
        assert_eq!(store.close(CloseOptions::default()), Err(StoreError::Closed));
    }

    #[test]
    fn test_config_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get_config("missing").unwrap(), None);

        store.set_config("theme", "dark").unwrap();
        store.set_config("name", "reef").unwrap();
        assert_eq!(store.get_config("theme").unwrap().as_deref(), Some("dark"));

        store.set_config("theme", "light").unwrap();
        assert_eq!(store.get_config("theme").unwrap().as_deref(), Some("light"));

        assert!(store.delete_config("theme").unwrap());
        assert!(!store.delete_config("theme").unwrap());

        store.delete_all_config().unwrap();
        assert_eq!(store.get_config("name").unwrap(), None);
    }
}
