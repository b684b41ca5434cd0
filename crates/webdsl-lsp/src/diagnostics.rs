//! Diagnostics engine.
//!
//! Analyses document snapshots and publishes one complete diagnostic set per
//! URI. A set always replaces the previous one. A result is only published
//! while its revision is still the stored one and is newer than whatever was
//! last published for that URI, so a slow analysis of old text can never
//! overwrite a newer set or resurrect markers on a closed document.
use dashmap::DashMap;

use crate::analysis::Analyzer;
use crate::document::{DocumentSnapshot, DocumentStore};
use crate::outbox::Outbox;
use crate::types::Diagnostic;

#[derive(Debug, Clone)]
struct Published {
    revision: u64,
    diagnostics: Vec<Diagnostic>,
}

/// Publishes diagnostics for open documents.
#[derive(Debug)]
pub struct DiagnosticsEngine {
    analyzer: Analyzer,
    outbox: Outbox,
    published: DashMap<String, Published>,
}

impl DiagnosticsEngine {
    /// Create an engine that publishes through `outbox`.
    pub fn new(analyzer: Analyzer, outbox: Outbox) -> Self {
        Self {
            analyzer,
            outbox,
            published: DashMap::new(),
        }
    }

    /// Analyse `snapshot` and publish the result if it is still current.
    ///
    /// Returns `true` when a set was published.
    pub fn refresh(&self, store: &DocumentStore, snapshot: &DocumentSnapshot) -> bool {
        let analysis = self.analyzer.analyze(&snapshot.text);
        tracing::debug!(
            uri = %snapshot.uri,
            revision = snapshot.revision,
            count = analysis.diagnostics.len(),
            "analysis finished"
        );
        self.publish_if_current(store, &snapshot.uri, snapshot.revision, analysis.diagnostics)
    }

    /// Publish `diagnostics` for `uri` at `revision`, unless the stored
    /// document has moved on or a newer set was already published.
    pub fn publish_if_current(
        &self,
        store: &DocumentStore,
        uri: &str,
        revision: u64,
        diagnostics: Vec<Diagnostic>,
    ) -> bool {
        // The entry lock orders the freshness check and the send per URI.
        let mut entry = self
            .published
            .entry(uri.to_string())
            .or_insert_with(|| Published {
                revision: 0,
                diagnostics: Vec::new(),
            });

        if revision <= entry.revision || store.revision(uri) != Some(revision) {
            tracing::debug!(uri, revision, "dropping stale diagnostics");
            drop(entry);
            self.published.remove_if(uri, |_, p| p.revision == 0);
            return false;
        }

        if let Err(e) = self.outbox.publish_diagnostics(uri, diagnostics.clone()) {
            tracing::warn!(uri, "could not publish diagnostics: {}", e);
            drop(entry);
            self.published.remove_if(uri, |_, p| p.revision == 0);
            return false;
        }
        entry.revision = revision;
        entry.diagnostics = diagnostics;
        true
    }

    /// Publish an empty set for a closed document and forget it.
    pub fn clear(&self, uri: &str, revision: u64) {
        {
            let mut entry = self
                .published
                .entry(uri.to_string())
                .or_insert_with(|| Published {
                    revision: 0,
                    diagnostics: Vec::new(),
                });
            if revision <= entry.revision {
                return;
            }
            if let Err(e) = self.outbox.publish_diagnostics(uri, Vec::new()) {
                tracing::warn!(uri, "could not clear diagnostics: {}", e);
            }
            entry.revision = revision;
            entry.diagnostics.clear();
        }
        self.published.remove(uri);
    }
}

#[cfg(test)]
impl DiagnosticsEngine {
    fn current(&self, uri: &str) -> Vec<Diagnostic> {
        self.published
            .get(uri)
            .map(|p| p.diagnostics.clone())
            .unwrap_or_default()
    }

    fn published_revision(&self, uri: &str) -> Option<u64> {
        self.published.get(uri).map(|p| p.revision)
    }

    fn tracked(&self) -> usize {
        self.published.len()
    }
}
