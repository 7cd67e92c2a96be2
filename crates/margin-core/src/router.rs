//! Query routing across all search sources.
//!
//! A query fans out to three sources and the results are concatenated in a
//! fixed category order, then capped:
//!
//! 1. Structured references (exact key hit, or full-text fallback)
//! 2. Named snippets (only for `<marker>:<prefix>` queries)
//! 3. Documents: every case-insensitive literal occurrence of the query in
//!    every document the index ranks as relevant, best document first
//!
//! The index decides *which* documents are relevant; the occurrence scan
//! finds *where* inside them, since the tokenized index has no character
//! offsets.

use crate::config::Config;
use crate::corpus::{NamedSnippetCorpus, ReferenceCorpus};
use crate::error::Result;
use crate::snapshot::IndexSnapshot;
use crate::snippet::PreviewWindow;
use crate::store::DocumentStore;
use crate::types::{Document, IndexStats, SearchResult};
use regex::{Regex, RegexBuilder};
use tracing::{debug, instrument, warn};

/// Default cap on merged results
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Façade over the document store and the static corpora.
///
/// ## Example
///
/// ```rust
/// use margin_core::{Document, IndexSnapshot, QueryRouter, SearchResult};
///
/// let mut router = QueryRouter::default();
/// router.set_index_data(Some(&IndexSnapshot::empty())).unwrap();
/// router
///     .add_index_data(vec![Document::new("a.md", "hello\nworld")])
///     .unwrap();
///
/// let results = router.search("hello");
/// assert!(matches!(results[0], SearchResult::Document { starts: 0, ends: 5, .. }));
/// ```
#[derive(Debug)]
pub struct QueryRouter {
    references: ReferenceCorpus,
    snippets: NamedSnippetCorpus,
    store: DocumentStore,
    max_results: usize,
    max_occurrences: Option<usize>,
}

impl QueryRouter {
    /// Create a router over the given corpora with an uninitialized store.
    pub fn new(references: ReferenceCorpus, snippets: NamedSnippetCorpus) -> Self {
        QueryRouter {
            references,
            snippets,
            store: DocumentStore::new(),
            max_results: DEFAULT_MAX_RESULTS,
            max_occurrences: None,
        }
    }

    /// Build a router from configuration, loading any configured corpus files.
    pub fn from_config(config: &Config) -> Result<Self> {
        let search = &config.search;

        let references = match &config.corpus.references_path {
            Some(path) => ReferenceCorpus::load(path, search.reference_fallback_limit)?,
            None => ReferenceCorpus::new(Vec::new(), search.reference_fallback_limit),
        };
        let snippets = match &config.corpus.snippets_path {
            Some(path) => NamedSnippetCorpus::load(search.snippet_marker.as_str(), path)?,
            None => NamedSnippetCorpus::with_defaults(search.snippet_marker.as_str()),
        };

        Ok(Self::new(references, snippets)
            .with_max_results(search.max_results)
            .with_max_occurrences(search.max_occurrences_per_document))
    }

    /// Set the cap on merged results.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Cap the matches reported per document (None = every occurrence).
    pub fn with_max_occurrences(mut self, max_occurrences: Option<usize>) -> Self {
        self.max_occurrences = max_occurrences;
        self
    }

    /// The snippet corpus, e.g. to render insertable text for a result.
    pub fn snippets(&self) -> &NamedSnippetCorpus {
        &self.snippets
    }

    /// Replace the document index; `None` or empty snapshot text clears it.
    pub fn set_index_data(&mut self, snapshot: Option<&IndexSnapshot>) -> Result<()> {
        self.store.load(snapshot)
    }

    /// Add documents; `None` when no index is loaded.
    pub fn add_index_data(&mut self, documents: Vec<Document>) -> Result<Option<IndexSnapshot>> {
        self.store.add(documents)
    }

    /// Document index statistics.
    pub fn stats(&self) -> IndexStats {
        self.store.stats()
    }

    /// Search every source and return at most `max_results` results.
    #[instrument(skip(self))]
    pub fn search(&self, criteria: &str) -> Vec<SearchResult> {
        if criteria.is_empty() {
            return Vec::new();
        }

        let mut results = self.references.search(criteria);
        results.extend(self.snippets.search(criteria));
        results.truncate(self.max_results);

        let remaining = self.max_results - results.len();
        if remaining > 0 {
            results.extend(self.search_documents(criteria, remaining));
        }

        debug!(results = results.len(), "Search complete");
        results
    }

    fn search_documents(&self, criteria: &str, limit: usize) -> Vec<SearchResult> {
        if !self.store.is_loaded() {
            return Vec::new();
        }

        let Some(pattern) = literal_pattern(criteria) else {
            return Vec::new();
        };
        let per_document = self.max_occurrences.unwrap_or(usize::MAX);

        self.store
            .query(criteria)
            .into_iter()
            .flat_map(|hit| {
                pattern
                    .find_iter(hit.text)
                    .take(per_document)
                    .map(move |m| {
                        let window = PreviewWindow::around(hit.text, m.start(), m.end());
                        SearchResult::Document {
                            path: hit.path.to_string(),
                            text: hit.text.to_string(),
                            starts: window.starts,
                            ends: window.ends,
                        }
                    })
            })
            .take(limit)
            .collect()
    }
}

impl Default for QueryRouter {
    fn default() -> Self {
        Self::new(ReferenceCorpus::default(), NamedSnippetCorpus::default())
    }
}

/// Case-insensitive regex matching `criteria` literally.
fn literal_pattern(criteria: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(criteria))
        .case_insensitive(true)
        .build()
        .map_err(|e| warn!(error = %e, "Could not compile search pattern"))
        .ok()
}
