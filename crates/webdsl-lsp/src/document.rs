//! Open-document store.
//!
//! One entry per URI holding the complete current text. Every stored text
//! carries a revision drawn from one process-wide counter, so revisions
//! strictly increase across opens, changes, saves and closes. Access is
//! serialized per URI by the map's shard locks; different URIs proceed
//! independently.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

/// An immutable view of a document at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    /// Document URI.
    pub uri: String,
    /// Complete text at this revision.
    pub text: Arc<str>,
    /// Store-assigned revision.
    pub revision: u64,
}

#[derive(Debug)]
struct Entry {
    text: Arc<str>,
    revision: u64,
}

/// Concurrency-safe map of open documents.
#[derive(Debug)]
pub struct DocumentStore {
    docs: DashMap<String, Entry>,
    next_revision: AtomicU64,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
            next_revision: AtomicU64::new(1),
        }
    }

    fn bump(&self) -> u64 {
        self.next_revision.fetch_add(1, Ordering::Relaxed)
    }

    fn store(&self, uri: &str, text: Arc<str>) -> DocumentSnapshot {
        let mut entry = self.docs.entry(uri.to_string()).or_insert_with(|| Entry {
            text: Arc::from(""),
            revision: 0,
        });
        // Allocate under the entry lock so per-URI revisions follow write order.
        entry.revision = self.bump();
        entry.text = text;
        DocumentSnapshot {
            uri: uri.to_string(),
            text: entry.text.clone(),
            revision: entry.revision,
        }
    }

    /// Insert a document, replacing any previous entry for `uri`.
    pub fn open(&self, uri: &str, text: impl Into<Arc<str>>) -> DocumentSnapshot {
        self.store(uri, text.into())
    }

    /// Replace the full text of a document.
    ///
    /// A change for a URI that was never opened is stored as if opened.
    pub fn change(&self, uri: &str, text: impl Into<Arc<str>>) -> DocumentSnapshot {
        if !self.docs.contains_key(uri) {
            tracing::warn!(uri, "change for a document that is not open; storing it");
        }
        self.store(uri, text.into())
    }

    /// Record a save.
    ///
    /// With `text` the stored content is replaced. Without it the existing
    /// content gets a fresh revision so it is analysed again. Returns `None`
    /// when there is nothing to analyse.
    pub fn save(&self, uri: &str, text: Option<String>) -> Option<DocumentSnapshot> {
        match text {
            Some(text) => Some(self.store(uri, text.into())),
            None => {
                let mut entry = self.docs.get_mut(uri)?;
                entry.revision = self.bump();
                Some(DocumentSnapshot {
                    uri: uri.to_string(),
                    text: entry.text.clone(),
                    revision: entry.revision,
                })
            }
        }
    }

    /// Remove a document. Returns the revision that marks the closure,
    /// newer than any revision the document had while open.
    pub fn close(&self, uri: &str) -> u64 {
        match self.docs.remove(uri) {
            Some(_) => {}
            None => tracing::debug!(uri, "close for a document that is not open"),
        }
        self.bump()
    }

    /// Current snapshot of `uri`, if open.
    pub fn get(&self, uri: &str) -> Option<DocumentSnapshot> {
        self.docs.get(uri).map(|entry| DocumentSnapshot {
            uri: uri.to_string(),
            text: entry.text.clone(),
            revision: entry.revision,
        })
    }

    /// Current revision of `uri`, if open.
    pub fn revision(&self, uri: &str) -> Option<u64> {
        self.docs.get(uri).map(|entry| entry.revision)
    }

    /// Number of open documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether no document is open.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "file:///srv/app.webdsl";

    #[test]
    fn open_then_get() {
        let store = DocumentStore::new();
        let snap = store.open(URI, "server 8080\n");
        assert_eq!(&*snap.text, "server 8080\n");
        assert_eq!(store.get(URI), Some(snap));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn change_replaces_wholesale() {
        let store = DocumentStore::new();
        let first = store.open(URI, "server 1\n");
        let second = store.change(URI, "server 2\n");
        assert!(second.revision > first.revision);
        assert_eq!(&*store.get(URI).unwrap().text, "server 2\n");
    }

    #[test]
    fn change_of_unopened_document_stores_it() {
        let store = DocumentStore::new();
        store.change(URI, "func f(): 1\n");
        assert!(store.get(URI).is_some());
    }

    #[test]
    fn save_with_text_replaces() {
        let store = DocumentStore::new();
        store.open(URI, "a");
        let snap = store.save(URI, Some("b".into())).unwrap();
        assert_eq!(&*snap.text, "b");
    }

    #[test]
    fn save_without_text_bumps_revision_only() {
        let store = DocumentStore::new();
        let opened = store.open(URI, "a");
        let saved = store.save(URI, None).unwrap();
        assert_eq!(saved.text, opened.text);
        assert!(saved.revision > opened.revision);
        assert_eq!(store.revision(URI), Some(saved.revision));
    }

    #[test]
    fn save_without_text_of_unknown_document() {
        let store = DocumentStore::new();
        assert!(store.save(URI, None).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn close_removes_and_returns_newer_revision() {
        let store = DocumentStore::new();
        let snap = store.open(URI, "a");
        let closed = store.close(URI);
        assert!(closed > snap.revision);
        assert!(store.get(URI).is_none());
        assert!(store.revision(URI).is_none());
    }

    #[test]
    fn reopen_gets_fresh_revision() {
        let store = DocumentStore::new();
        let first = store.open(URI, "a");
        let closed = store.close(URI);
        let reopened = store.open(URI, "a");
        assert!(reopened.revision > closed);
        assert!(reopened.revision > first.revision);
    }

    #[test]
    fn snapshot_survives_later_change() {
        let store = DocumentStore::new();
        let snap = store.open(URI, "old");
        store.change(URI, "new");
        assert_eq!(&*snap.text, "old");
    }

    #[test]
    fn concurrent_writers_leave_one_complete_text() {
        let store = Arc::new(DocumentStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let text = format!("server {}\n", 8000 + i).repeat(50);
                    for _ in 0..50 {
                        store.change(URI, text.as_str());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let snap = store.get(URI).unwrap();
        let first = snap.text.lines().next().unwrap().to_string();
        assert!(snap.text.lines().all(|l| l == first));
    }
}
