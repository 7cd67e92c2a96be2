//! Static corpora searched alongside the document index.
//!
//! Two small, fixed, in-memory corpora are consulted on every query:
//!
//! - [`NamedSnippetCorpus`]: reusable text blocks (diagram templates by
//!   default), addressed by `<marker>:<key prefix>`
//! - [`ReferenceCorpus`]: keyed reference text (e.g. articles of a legal
//!   code), addressed by exact key with a full-text fallback over a
//!   secondary index built once at construction
//!
//! Both are immutable after construction and safe to share.

use crate::error::{MarginError, Result};
use crate::index::InvertedIndex;
use crate::types::{Document, NamedSnippet, SearchResult, StructuredReference};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Diagram templates available when no snippet file is configured.
const DEFAULT_SNIPPETS: &[&str] = &[
    "graph TD\n    A[Start] --> B{Is it?}\n    B -->|Yes| C[OK]\n    B -->|No| D[End]",
    "graph LR\n    A --> B\n    B --> C",
    "sequenceDiagram\n    Alice->>Bob: Hello Bob, how are you?\n    Bob-->>Alice: Great!",
    "classDiagram\n    Animal <|-- Duck\n    Animal : +int age\n    Animal : +isMammal()",
    "stateDiagram-v2\n    [*] --> Still\n    Still --> Moving\n    Moving --> [*]",
    "erDiagram\n    CUSTOMER ||--o{ ORDER : places\n    ORDER ||--|{ LINE-ITEM : contains",
    "gantt\n    title A Gantt Diagram\n    dateFormat YYYY-MM-DD\n    section Section\n    A task :a1, 2024-01-01, 30d",
    "pie title Pets\n    \"Dogs\" : 386\n    \"Cats\" : 85",
    "journey\n    title My working day\n    section Go to work\n      Make tea: 5: Me",
];

/// A snippet file entry: a bare string is its own key.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnippetEntry {
    Bare(String),
    Named(NamedSnippet),
}

impl From<SnippetEntry> for NamedSnippet {
    fn from(entry: SnippetEntry) -> Self {
        match entry {
            SnippetEntry::Bare(text) => NamedSnippet::new(text.clone(), text),
            SnippetEntry::Named(snippet) => snippet,
        }
    }
}

/// Named snippets addressed by a marker prefix.
///
/// A query `mermaid:seq` with marker `mermaid` returns every snippet whose
/// key starts with `seq`. Queries without the marker never match.
#[derive(Debug, Clone)]
pub struct NamedSnippetCorpus {
    marker: String,
    prefix: String,
    snippets: Vec<NamedSnippet>,
}

impl NamedSnippetCorpus {
    /// Create a corpus from snippets.
    pub fn new(marker: impl Into<String>, snippets: Vec<NamedSnippet>) -> Self {
        let marker = marker.into();
        NamedSnippetCorpus {
            prefix: format!("{}:", marker),
            marker,
            snippets,
        }
    }

    /// The built-in diagram templates.
    pub fn with_defaults(marker: impl Into<String>) -> Self {
        let snippets = DEFAULT_SNIPPETS
            .iter()
            .map(|&text| NamedSnippet::new(text, text))
            .collect();
        Self::new(marker, snippets)
    }

    /// Parse a JSON array of strings or `{ "key", "text" }` objects.
    pub fn from_json(marker: impl Into<String>, source_name: &str, json: &str) -> Result<Self> {
        let entries: Vec<SnippetEntry> =
            serde_json::from_str(json).map_err(|e| MarginError::corpus(source_name, e.to_string()))?;
        Ok(Self::new(
            marker,
            entries.into_iter().map(NamedSnippet::from).collect(),
        ))
    }

    /// Load a JSON snippet file.
    pub fn load(marker: impl Into<String>, path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let corpus = Self::from_json(marker, &path.display().to_string(), &contents)?;
        info!(path = %path.display(), snippets = corpus.len(), "Loaded snippet corpus");
        Ok(corpus)
    }

    /// The marker that activates this corpus.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Number of snippets.
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    /// Check if the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// All snippets whose key starts with the text after the marker.
    pub fn search(&self, criteria: &str) -> Vec<SearchResult> {
        let Some(rest) = criteria.strip_prefix(&self.prefix) else {
            return Vec::new();
        };

        self.snippets
            .iter()
            .filter(|s| s.key.starts_with(rest))
            .map(|s| SearchResult::Snippet {
                text: s.text.clone(),
            })
            .collect()
    }

    /// The fenced block an editor inserts for a selected snippet.
    pub fn insertable(&self, text: &str) -> String {
        format!("```{}\n{}\n```\n", self.marker, text)
    }
}

impl Default for NamedSnippetCorpus {
    fn default() -> Self {
        Self::with_defaults("mermaid")
    }
}

/// Body of a reference file entry; the key is the JSON object key.
#[derive(Deserialize)]
struct ReferenceBody {
    title: String,
    text: String,
}

/// Keyed reference text with a full-text fallback.
///
/// An exact key hit is authoritative: it is returned alone and the
/// secondary index is not consulted.
#[derive(Debug)]
pub struct ReferenceCorpus {
    entries: Vec<StructuredReference>,
    by_key: HashMap<String, usize>,
    index: InvertedIndex,
    fallback_limit: usize,
}

impl ReferenceCorpus {
    /// Default number of fallback results
    pub const DEFAULT_FALLBACK_LIMIT: usize = 10;

    /// Create a corpus and build its secondary index.
    ///
    /// When keys repeat, the first entry wins.
    pub fn new(entries: Vec<StructuredReference>, fallback_limit: usize) -> Self {
        let mut by_key = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            by_key.entry(entry.key.clone()).or_insert(i);
        }

        let index = InvertedIndex::from_documents(
            entries
                .iter()
                .enumerate()
                .filter(|(i, e)| by_key.get(&e.key) == Some(i))
                .map(|(_, e)| Document::new(e.key.clone(), e.text.clone())),
        );

        debug!(
            entries = entries.len(),
            bytes = index.total_bytes(),
            "Built reference index"
        );

        ReferenceCorpus {
            entries,
            by_key,
            index,
            fallback_limit,
        }
    }

    /// Create an empty corpus.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Self::DEFAULT_FALLBACK_LIMIT)
    }

    /// Parse a JSON object mapping keys to `{ "title", "text" }`.
    ///
    /// Entries are indexed in key order.
    pub fn from_json(source_name: &str, json: &str, fallback_limit: usize) -> Result<Self> {
        let map: BTreeMap<String, ReferenceBody> =
            serde_json::from_str(json).map_err(|e| MarginError::corpus(source_name, e.to_string()))?;
        let entries = map
            .into_iter()
            .map(|(key, body)| StructuredReference::new(key, body.title, body.text))
            .collect();
        Ok(Self::new(entries, fallback_limit))
    }

    /// Load a JSON reference file.
    pub fn load(path: &Path, fallback_limit: usize) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let corpus = Self::from_json(&path.display().to_string(), &contents, fallback_limit)?;
        info!(path = %path.display(), entries = corpus.len(), "Loaded reference corpus");
        Ok(corpus)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact key lookup.
    pub fn get(&self, key: &str) -> Option<&StructuredReference> {
        self.by_key.get(key).map(|&i| &self.entries[i])
    }

    /// Exact key hit alone, or up to `fallback_limit` full-text hits.
    pub fn search(&self, criteria: &str) -> Vec<SearchResult> {
        if let Some(entry) = self.get(criteria) {
            return vec![to_result(entry)];
        }

        self.index
            .query(criteria)
            .into_iter()
            .take(self.fallback_limit)
            .filter_map(|hit| self.get(hit.path))
            .map(to_result)
            .collect()
    }
}

impl Default for ReferenceCorpus {
    fn default() -> Self {
        Self::empty()
    }
}

fn to_result(entry: &StructuredReference) -> SearchResult {
    SearchResult::Reference {
        title: entry.title.clone(),
        text: entry.text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_references() -> ReferenceCorpus {
        ReferenceCorpus::from_json(
            "test",
            r#"{
                "cn:1": { "title": "Constitution - Article 1", "text": "The nation adopts a federal republican form of government" },
                "cn:2": { "title": "Constitution - Article 2", "text": "The federal government supports the catholic roman cult" },
                "cn:14": { "title": "Constitution - Article 14", "text": "All inhabitants enjoy the right to work and to petition the authorities" }
            }"#,
            10,
        )
        .unwrap()
    }

    #[test]
    fn test_snippet_requires_marker() {
        let corpus = NamedSnippetCorpus::new("mermaid", vec![NamedSnippet::new("diagram-x", "diagram-x")]);
        assert!(corpus.search("diagram-").is_empty());
        assert!(corpus.search("other:diagram-").is_empty());
    }

    #[test]
    fn test_snippet_prefix_match() {
        let corpus = NamedSnippetCorpus::from_json(
            "mermaid",
            "test",
            r#"["diagram-x", "diagram-y", {"key": "flow", "text": "graph TD"}]"#,
        )
        .unwrap();

        let results = corpus.search("mermaid:diagram-");
        assert_eq!(
            results,
            vec![
                SearchResult::Snippet { text: "diagram-x".to_string() },
                SearchResult::Snippet { text: "diagram-y".to_string() },
            ]
        );

        let results = corpus.search("mermaid:fl");
        assert_eq!(results, vec![SearchResult::Snippet { text: "graph TD".to_string() }]);

        // Empty rest matches every snippet
        assert_eq!(corpus.search("mermaid:").len(), 3);
    }

    #[test]
    fn test_default_snippets() {
        let corpus = NamedSnippetCorpus::default();
        assert_eq!(corpus.marker(), "mermaid");
        let results = corpus.search("mermaid:sequence");
        assert_eq!(results.len(), 1);
        assert_eq!(corpus.search("mermaid:graph").len(), 2);
    }

    #[test]
    fn test_insertable() {
        let corpus = NamedSnippetCorpus::default();
        assert_eq!(corpus.insertable("graph LR"), "```mermaid\ngraph LR\n```\n");
    }

    #[test]
    fn test_invalid_snippet_json() {
        let err = NamedSnippetCorpus::from_json("mermaid", "bad.json", r#"{"not": "a list"}"#).unwrap_err();
        assert!(matches!(err, MarginError::CorpusError { .. }));
    }

    #[test]
    fn test_reference_exact_hit_is_exclusive() {
        let corpus = make_references();
        let results = corpus.search("cn:1");
        assert_eq!(
            results,
            vec![SearchResult::Reference {
                title: "Constitution - Article 1".to_string(),
                text: "The nation adopts a federal republican form of government".to_string(),
            }]
        );
    }

    #[test]
    fn test_reference_fallback() {
        let corpus = make_references();
        let results = corpus.search("federal government");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.kind() == "reference"));

        assert!(corpus.search("nonexistent words").is_empty());
    }

    #[test]
    fn test_reference_fallback_limit() {
        let entries = (0..25)
            .map(|i| StructuredReference::new(format!("k{}", i), format!("T{}", i), "common text"))
            .collect();
        let corpus = ReferenceCorpus::new(entries, 10);
        assert_eq!(corpus.search("common").len(), 10);
    }

    #[test]
    fn test_reference_duplicate_keys_first_wins() {
        let corpus = ReferenceCorpus::new(
            vec![
                StructuredReference::new("k", "first", "alpha"),
                StructuredReference::new("k", "second", "beta"),
            ],
            10,
        );
        assert_eq!(corpus.get("k").map(|e| e.title.as_str()), Some("first"));
        assert!(corpus.search("beta").is_empty());
        assert_eq!(corpus.search("alpha").len(), 1);
    }
}
