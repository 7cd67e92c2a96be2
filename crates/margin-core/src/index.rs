//! Full-text document index.
//!
//! This module wraps the [`bm25`](https://crates.io/crates/bm25) crate's
//! search engine and adds what the store needs on top of it:
//!
//! - Documents keyed by path; inserting an existing path replaces it
//! - The original document text, returned with every hit
//! - Insertion order, used to break score ties
//! - A plain document list that can be serialized and rebuilt into an
//!   equivalent engine (see [`crate::snapshot`])
//!
//! ## Architecture
//!
//! - A `Vec<Document>` stores documents in insertion order; a document's
//!   position is its slot
//! - A `HashMap<String, usize>` maps paths to slots
//! - A `bm25::SearchEngine<String>` keyed by path does tokenizing and scoring
//!
//! Replacing a document keeps its slot, so a replaced document keeps its
//! original position for tie-breaking.

use crate::error::{MarginError, Result};
use crate::types::Document;
use bm25::{Language, SearchEngine, SearchEngineBuilder};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, instrument};

/// A ranked query hit, borrowing the document from the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentHit<'a> {
    pub path: &'a str,
    pub text: &'a str,
    pub score: f32,
}

/// Full-text index over documents keyed by path.
///
/// ## Example
///
/// ```rust
/// use margin_core::{Document, InvertedIndex};
///
/// let mut index = InvertedIndex::new();
/// index.insert(Document::new("a.md", "hello world"));
///
/// let hits = index.query("hello");
/// assert_eq!(hits[0].path, "a.md");
/// ```
pub struct InvertedIndex {
    /// All documents, in insertion order
    documents: Vec<Document>,

    /// Path to slot
    slots: HashMap<String, usize>,

    /// BM25 engine keyed by path
    engine: SearchEngine<String>,
}

/// Every engine starts empty and only grows by upserts, so an index rebuilt
/// from its document list scores exactly like the one it was saved from.
fn empty_engine() -> SearchEngine<String> {
    let no_documents: Vec<bm25::Document<String>> = Vec::new();
    SearchEngineBuilder::<String>::with_documents(Language::English, no_documents).build()
}

impl InvertedIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        InvertedIndex {
            documents: Vec::new(),
            slots: HashMap::new(),
            engine: empty_engine(),
        }
    }

    /// Build an index from documents, in order.
    ///
    /// Later documents replace earlier ones with the same path.
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let mut index = Self::new();
        index.extend(documents);
        index
    }

    /// Rebuild an index from a serialized document list.
    ///
    /// Unlike [`InvertedIndex::from_documents`], a repeated path is an error:
    /// a list written by [`InvertedIndex::documents`] never has one.
    pub(crate) fn restore(documents: Vec<Document>) -> Result<Self> {
        let mut index = Self::new();
        for document in documents {
            if index.slots.contains_key(&document.path) {
                return Err(MarginError::corrupted(format!(
                    "duplicate document path {:?}",
                    document.path
                )));
            }
            index.insert(document);
        }
        Ok(index)
    }

    /// All documents, in insertion order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents in the index.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total size of all document texts in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.documents.iter().map(|d| d.text.len() as u64).sum()
    }

    /// Insert a document, replacing any document with the same path.
    pub fn insert(&mut self, document: Document) {
        self.engine.upsert(bm25::Document {
            id: document.path.clone(),
            contents: document.text.clone(),
        });

        match self.slots.get(&document.path) {
            Some(&slot) => {
                debug!(path = %document.path, slot, "Replaced document");
                self.documents[slot] = document;
            }
            None => {
                self.slots.insert(document.path.clone(), self.documents.len());
                self.documents.push(document);
            }
        }
    }

    /// Insert many documents in order.
    #[instrument(skip(self, documents))]
    pub fn extend(&mut self, documents: impl IntoIterator<Item = Document>) {
        let before = self.len();
        for document in documents {
            self.insert(document);
        }
        debug!(
            added = self.len() - before,
            total = self.len(),
            "Documents indexed"
        );
    }

    /// Search the index with free text.
    ///
    /// Documents are scored by the BM25 engine and returned best-first.
    /// Equal scores keep insertion order. The result is unbounded; callers
    /// cap it.
    pub fn query(&self, text: &str) -> Vec<DocumentHit<'_>> {
        if self.documents.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, f32)> = self
            .engine
            .search(text, self.documents.len())
            .into_iter()
            .filter_map(|result| {
                self.slots
                    .get(&result.document.id)
                    .map(|&slot| (slot, result.score))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .map(|(slot, score)| {
                let document = &self.documents[slot];
                DocumentHit {
                    path: &document.path,
                    text: &document.text,
                    score,
                }
            })
            .collect()
    }
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvertedIndex")
            .field("documents", &self.documents.len())
            .finish_non_exhaustive()
    }
}
