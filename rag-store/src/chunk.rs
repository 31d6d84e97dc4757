/// The chunk model: raw text, opaque external payloads, and references into
/// other stored collections.
use serde::{Deserialize, Serialize};

/// A single element of an index (a chunk sequence).
///
/// Equality and fingerprinting only ever look at `Raw` and `External`
/// variants — `RefBySource`/`RefByIndex` are compression *output*, never
/// dedup input (see [`crate::compression`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chunk {
    /// A chunk carrying its payload inline.
    Raw {
        /// The chunk's text.
        text: String,
    },
    /// A caller-defined opaque blob. The core never interprets its
    /// structure, only its [`ExternalChunk::projection`].
    External(ExternalChunk),
    /// A pointer into a stored sequence, resolved by looking up a chunk by
    /// name within that sequence.
    RefBySource {
        /// The collection the reference points into.
        collection_id: String,
        /// The name used to look up the target entry.
        source_key: String,
    },
    /// A pointer into a stored sequence, resolved by zero-based position.
    RefByIndex {
        /// The collection the reference points into.
        collection_id: String,
        /// The zero-based position of the target chunk.
        position: usize,
    },
}

/// A caller-defined chunk value treated as opaque by compression.
///
/// Conforms to the external collaborator contract in spec §6: a stable
/// string projection for equality/fingerprinting, and a body that
/// round-trips through serialization unexamined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalChunk {
    /// Stable identity used for equality and fingerprinting.
    pub projection: String,
    /// Opaque payload, persisted verbatim and never interpreted.
    pub body: serde_json::Value,
}

impl Chunk {
    /// Convenience constructor for a [`Chunk::Raw`].
    pub fn raw(text: impl Into<String>) -> Self {
        Chunk::Raw { text: text.into() }
    }

    /// Convenience constructor for a [`Chunk::RefByIndex`].
    pub fn ref_by_index(collection_id: impl Into<String>, position: usize) -> Self {
        Chunk::RefByIndex {
            collection_id: collection_id.into(),
            position,
        }
    }

    /// Convenience constructor for a [`Chunk::RefBySource`].
    pub fn ref_by_source(collection_id: impl Into<String>, source_key: impl Into<String>) -> Self {
        Chunk::RefBySource {
            collection_id: collection_id.into(),
            source_key: source_key.into(),
        }
    }

    /// Whether this chunk is a reference (compression output, not dedup input).
    pub fn is_reference(&self) -> bool {
        matches!(self, Chunk::RefBySource { .. } | Chunk::RefByIndex { .. })
    }

    /// Canonical string projection used for equality and fingerprinting.
    ///
    /// `Raw` projects to its text, `External` to its caller-supplied
    /// projection. Reference chunks have no projection — they are never
    /// fingerprint input (see spec §4.2).
    pub fn projection(&self) -> Option<&str> {
        match self {
            Chunk::Raw { text } => Some(text.as_str()),
            Chunk::External(ext) => Some(ext.projection.as_str()),
            Chunk::RefBySource { .. } | Chunk::RefByIndex { .. } => None,
        }
    }
}

/// An ordered sequence of chunks submitted together and identified by a
/// single fingerprint. Order is significant; positions are stable once
/// stored. Empty sequences are legal.
pub type Index = Vec<Chunk>;
