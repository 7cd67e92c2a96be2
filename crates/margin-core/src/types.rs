//! Core data types for Margin.
//!
//! This module defines the values that cross the worker boundary:
//!
//! - **Owned**: Every type owns its strings so it can be moved through a
//!   channel without sharing memory with the caller
//! - **Serializable**: Results are emitted as JSON by hosts, documents are
//!   stored inside snapshots
//! - **Strongly tagged**: A result's `kind` fully determines its shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A document supplied by the host for full-text indexing.
///
/// `path` is the identity key: adding a document whose path is already
/// indexed replaces the earlier entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Host-assigned identifier, usually a file path
    pub path: String,

    /// Full document text
    pub text: String,
}

impl Document {
    /// Create a new document
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Document {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A reusable text block addressable by key prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSnippet {
    pub key: String,
    pub text: String,
}

impl NamedSnippet {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        NamedSnippet {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// A keyed entry of the static reference corpus (e.g. one article of a law).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredReference {
    pub key: String,
    pub title: String,
    pub text: String,
}

impl StructuredReference {
    pub fn new(key: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        StructuredReference {
            key: key.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}

/// A single search result.
///
/// Serialized with a `kind` tag so hosts can dispatch on it:
///
/// ```json
/// { "kind": "document", "path": "a.md", "text": "...", "starts": 0, "ends": 5 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchResult {
    /// A named snippet whose key matched the marker prefix
    Snippet { text: String },

    /// A structured reference, either an exact key hit or a full-text fallback
    Reference { title: String, text: String },

    /// One occurrence of the criteria inside an indexed document.
    ///
    /// `text` is the whole document; `[starts, ends)` is the byte range of
    /// the line-aligned preview window around the occurrence.
    Document {
        path: String,
        text: String,
        starts: usize,
        ends: usize,
    },
}

impl SearchResult {
    /// The result category name, as used in the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchResult::Snippet { .. } => "snippet",
            SearchResult::Reference { .. } => "reference",
            SearchResult::Document { .. } => "document",
        }
    }

    /// The preview text for display: the window for document matches, the
    /// whole text otherwise.
    pub fn preview(&self) -> &str {
        match self {
            SearchResult::Snippet { text } | SearchResult::Reference { text, .. } => text,
            SearchResult::Document {
                text, starts, ends, ..
            } => text.get(*starts..*ends).unwrap_or(text).trim_matches('\n'),
        }
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchResult::Snippet { text } => write!(f, "[snippet] {}", text),
            SearchResult::Reference { title, .. } => write!(f, "[reference] {}", title),
            SearchResult::Document { path, .. } => {
                write!(f, "[document] {}: {}", path, self.preview())
            }
        }
    }
}

/// Statistics about the document index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Whether an index is loaded (false until the first snapshot arrives)
    pub loaded: bool,

    /// Number of documents in the index
    pub document_count: u64,

    /// Total size of the indexed document texts in bytes
    pub total_bytes: u64,

    /// When the index was last loaded or extended
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_kind_tag() {
        let result = SearchResult::Document {
            path: "a.md".to_string(),
            text: "hello".to_string(),
            starts: 0,
            ends: 5,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "document");
        assert_eq!(json["path"], "a.md");
        assert_eq!(json["ends"], 5);
        assert_eq!(result.kind(), "document");

        let result = SearchResult::Reference {
            title: "Art. 1".to_string(),
            text: "body".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "reference");
        assert!(json.get("path").is_none());
    }

    #[test]
    fn test_result_from_json() {
        let result: SearchResult =
            serde_json::from_str(r#"{"kind":"snippet","text":"graph TD"}"#).unwrap();
        assert_eq!(
            result,
            SearchResult::Snippet {
                text: "graph TD".to_string()
            }
        );
    }

    #[test]
    fn test_document_preview() {
        let result = SearchResult::Document {
            path: "a.md".to_string(),
            text: "hello\nworld\nhello again".to_string(),
            starts: 11,
            ends: 23,
        };
        assert_eq!(result.preview(), "hello again");
        assert_eq!(result.to_string(), "[document] a.md: hello again");
    }
}
