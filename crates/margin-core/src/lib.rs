//! # Margin Core Library
//!
//! This crate provides the search engine behind Margin: a full-text inverted
//! index over an evolving set of documents, two small static corpora searched
//! by key, and a query router that merges everything into one capped result
//! list. The whole engine runs on a dedicated worker thread and is driven
//! through message passing, so indexing and query cost never block the caller.
//!
//! ## Architecture
//!
//! - **Snippet** (`snippet`): Line-aligned preview windows around a match
//! - **Index** (`index`): BM25 full-text engine keyed by document path
//! - **Snapshot** (`snapshot`): Opaque, checksummed serialized index state
//! - **Store** (`store`): Loaded/uninitialized document index state
//! - **Corpus** (`corpus`): Named-snippet and structured-reference searchers
//! - **Router** (`router`): Query fan-out, merge and cap
//! - **Worker** (`worker`): Isolated execution context with async requests
//! - **Config** (`config`): Configuration management
//!
//! ## Example
//!
//! ```rust,ignore
//! use margin_core::{Document, IndexSnapshot, QueryRouter, SearchWorker};
//!
//! let worker = SearchWorker::spawn(QueryRouter::default())?;
//! worker.set_index_data(Some(IndexSnapshot::empty())).wait()?;
//! worker
//!     .add_index_data(vec![Document::new("a.md", "hello\nworld")])
//!     .wait()?;
//!
//! for result in worker.search("hello").wait()? {
//!     println!("{:?}", result);
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod router;
pub mod snapshot;
pub mod snippet;
pub mod store;
pub mod types;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use corpus::{NamedSnippetCorpus, ReferenceCorpus};
pub use error::{MarginError, Result};
pub use index::{DocumentHit, InvertedIndex};
pub use router::QueryRouter;
pub use snapshot::IndexSnapshot;
pub use snippet::PreviewWindow;
pub use store::DocumentStore;
pub use types::{Document, IndexStats, NamedSnippet, SearchResult, StructuredReference};
pub use worker::{Pending, SearchWorker};
