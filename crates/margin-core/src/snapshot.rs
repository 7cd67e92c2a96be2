//! Serialized index snapshots.
//!
//! A snapshot is the complete state of an [`InvertedIndex`] as a single
//! string. Hosts treat it as an opaque blob: they store it wherever they keep
//! documents and hand it back on the next session. The format is designed
//! for:
//!
//! - Text transport: the snapshot is valid UTF-8 and can be stored as a file
//!   in any document host
//! - Versioning: format changes are detected on load
//! - Integrity: a checksum over the payload detects truncation and edits
//!
//! ## Snapshot Format
//!
//! ```text
//! MRGN <version> <crc32 as 8 hex digits>\n
//! <JSON payload: {"documents": [{"path", "text"}, ...]}>
//! ```
//!
//! The payload carries documents in insertion order; decoding rebuilds the
//! search engine from them. Version 1 payloads also carried postings and
//! length statistics; those fields are ignored.

use crate::error::{MarginError, Result};
use crate::index::InvertedIndex;
use crate::types::Document;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Magic tag at the start of every snapshot
pub const SNAPSHOT_MAGIC: &str = "MRGN";
/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 2;

/// JSON payload of an index with no documents
const EMPTY_PAYLOAD: &str = r#"{"documents":[]}"#;

#[derive(Serialize)]
struct PayloadRef<'a> {
    documents: &'a [Document],
}

#[derive(Deserialize)]
struct Payload {
    documents: Vec<Document>,
}

/// Opaque serialized index state.
///
/// `IndexSnapshot::encode(&index)?.decode()?` answers every query exactly
/// like `index` does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexSnapshot(String);

impl IndexSnapshot {
    /// Snapshot of an index with no documents.
    ///
    /// Loading it moves a store into the loaded state, after which documents
    /// can be added.
    pub fn empty() -> Self {
        Self::seal(EMPTY_PAYLOAD.to_string())
    }

    /// Serialize an index.
    pub fn encode(index: &InvertedIndex) -> Result<Self> {
        let payload = serde_json::to_string(&PayloadRef {
            documents: index.documents(),
        })?;
        debug!(
            documents = index.len(),
            bytes = payload.len(),
            "Encoded index snapshot"
        );
        Ok(Self::seal(payload))
    }

    fn seal(payload: String) -> Self {
        let checksum = crc32fast::hash(payload.as_bytes());
        IndexSnapshot(format!(
            "{} {} {:08x}\n{}",
            SNAPSHOT_MAGIC, SNAPSHOT_VERSION, checksum, payload
        ))
    }

    /// Deserialize and validate the index.
    ///
    /// Fails without side effects if the header, checksum or payload is
    /// invalid.
    pub fn decode(&self) -> Result<InvertedIndex> {
        let (header, payload) = self
            .0
            .split_once('\n')
            .ok_or_else(|| MarginError::corrupted("missing snapshot header"))?;

        let mut fields = header.split(' ');
        if fields.next() != Some(SNAPSHOT_MAGIC) {
            return Err(MarginError::corrupted("invalid magic tag in header"));
        }

        let version: u32 = fields
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| MarginError::corrupted("invalid version in header"))?;
        // Accept older versions; newer versions fail.
        if version > SNAPSHOT_VERSION {
            return Err(MarginError::SnapshotVersionMismatch {
                found: version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let stored_checksum = fields
            .next()
            .and_then(|c| u32::from_str_radix(c, 16).ok())
            .ok_or_else(|| MarginError::corrupted("invalid checksum in header"))?;
        let computed_checksum = crc32fast::hash(payload.as_bytes());
        if stored_checksum != computed_checksum {
            return Err(MarginError::corrupted(format!(
                "checksum mismatch: expected {:08x}, got {:08x}",
                stored_checksum, computed_checksum
            )));
        }

        let payload: Payload = serde_json::from_str(payload)
            .map_err(|e| MarginError::corrupted(format!("payload deserialization failed: {}", e)))?;
        let index = InvertedIndex::restore(payload.documents)?;

        debug!(documents = index.len(), "Decoded index snapshot");
        Ok(index)
    }

    /// The snapshot text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the snapshot, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Size of the snapshot in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True only for empty text wrapped from the host; an encoded empty
    /// index still has a header. Stores treat empty text like no snapshot.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for IndexSnapshot {
    /// Wrap snapshot text read back from the host's storage. Validation
    /// happens on [`IndexSnapshot::decode`].
    fn from(text: String) -> Self {
        IndexSnapshot(text)
    }
}

impl AsRef<str> for IndexSnapshot {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
