//! Error types for Margin core operations.
//!
//! This module defines well-structured error types using `thiserror` for
//! library-level errors, while the CLI uses `anyhow` for convenient error
//! handling at command boundaries.

use thiserror::Error;

/// Result type alias using MarginError
pub type Result<T> = std::result::Result<T, MarginError>;

/// Core error types for Margin operations.
///
/// Only the snapshot load path and the host-facing setup (config, corpus
/// files, worker startup) produce errors. Search itself never fails; it
/// degrades to fewer results.
#[derive(Error, Debug)]
pub enum MarginError {
    // === Snapshot Errors ===
    /// The snapshot text is not a valid serialized index
    #[error("snapshot is corrupted: {reason}")]
    SnapshotCorrupted { reason: String },

    /// The snapshot format version is newer than this build understands
    #[error("snapshot version mismatch: found {found}, expected {expected}")]
    SnapshotVersionMismatch { found: u32, expected: u32 },

    // === Corpus Errors ===
    /// A static corpus file could not be parsed
    #[error("corpus {source_name} is invalid: {reason}")]
    CorpusError { source_name: String, reason: String },

    // === Configuration Errors ===
    /// Configuration file parsing failed
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === Worker Errors ===
    /// The search worker thread has exited and can no longer answer requests
    #[error("search worker is no longer running")]
    WorkerUnavailable,

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// Serialization/deserialization failed
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl MarginError {
    /// Returns true if this error came from decoding a snapshot.
    ///
    /// The host typically reacts by discarding the stored snapshot and
    /// starting from an empty index.
    pub fn is_snapshot_error(&self) -> bool {
        matches!(
            self,
            MarginError::SnapshotCorrupted { .. } | MarginError::SnapshotVersionMismatch { .. }
        )
    }

    /// Create a snapshot corruption error
    pub fn corrupted(reason: impl Into<String>) -> Self {
        MarginError::SnapshotCorrupted {
            reason: reason.into(),
        }
    }

    /// Create a corpus error
    pub fn corpus(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        MarginError::CorpusError {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MarginError {
    fn from(err: serde_json::Error) -> Self {
        MarginError::Serialization(err.to_string())
    }
}
