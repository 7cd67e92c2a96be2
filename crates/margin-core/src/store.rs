//! Document index state.
//!
//! The store is either **uninitialized** (no index; document search finds
//! nothing and additions are ignored) or **loaded** (an index is present,
//! possibly with no documents). Loading a snapshot moves it to loaded;
//! loading `None` or an empty snapshot moves it back to uninitialized.

use crate::error::Result;
use crate::index::{DocumentHit, InvertedIndex};
use crate::snapshot::IndexSnapshot;
use crate::types::{Document, IndexStats};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

/// Owner of the document index.
#[derive(Debug, Default)]
pub struct DocumentStore {
    index: Option<InvertedIndex>,
    last_updated: Option<DateTime<Utc>>,
}

impl DocumentStore {
    /// Create an uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an index is loaded.
    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    /// Replace the index wholesale.
    ///
    /// `None` or an empty snapshot clears the store back to uninitialized.
    /// A snapshot that fails to decode leaves the current index untouched.
    #[instrument(skip(self, snapshot), fields(clear = snapshot.map_or(true, |s| s.is_empty())))]
    pub fn load(&mut self, snapshot: Option<&IndexSnapshot>) -> Result<()> {
        match snapshot.filter(|s| !s.is_empty()) {
            None => {
                if self.index.take().is_some() {
                    info!("Document index cleared");
                }
            }
            Some(snapshot) => {
                let index = snapshot.decode()?;
                info!(
                    documents = index.len(),
                    bytes = index.total_bytes(),
                    "Document index loaded"
                );
                self.index = Some(index);
            }
        }
        self.last_updated = Some(Utc::now());
        Ok(())
    }

    /// Merge documents into the index and return the new snapshot.
    ///
    /// Returns `Ok(None)` without touching anything when no index is
    /// loaded; hosts may call this before their first load.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub fn add(&mut self, documents: Vec<Document>) -> Result<Option<IndexSnapshot>> {
        let Some(index) = self.index.as_mut() else {
            warn!("No document index loaded, ignoring added documents");
            return Ok(None);
        };

        index.extend(documents);
        self.last_updated = Some(Utc::now());
        debug!(documents = index.len(), "Documents added");

        IndexSnapshot::encode(index).map(Some)
    }

    /// Ranked free-text search. Empty when uninitialized.
    pub fn query(&self, text: &str) -> Vec<DocumentHit<'_>> {
        self.index
            .as_ref()
            .map(|index| index.query(text))
            .unwrap_or_default()
    }

    /// Current statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            loaded: self.is_loaded(),
            document_count: self.index.as_ref().map_or(0, |i| i.len() as u64),
            total_bytes: self.index.as_ref().map_or(0, |i| i.total_bytes()),
            last_updated: self.last_updated,
        }
    }
}
