/// Error types for the RAG store.

/// Errors produced by the dataset/testcase stores, the compression engine,
/// and the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum RagStoreError {
    /// A requested fingerprint is absent from the `DatasetStore`.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A reference chunk points at a `collection_id` that is not in the pool.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// A `RefBySource` chunk's `source_key` is absent from its target collection.
    #[error("unknown source '{source}' in collection '{collection}'")]
    UnknownSource {
        /// Collection the reference points at.
        collection: String,
        /// Source key that was not found.
        source: String,
    },

    /// A `RefByIndex` chunk's `position` falls outside its target collection.
    #[error("index {position} out of range for collection '{collection}'")]
    IndexOutOfRange {
        /// Collection the reference points at.
        collection: String,
        /// Position that was out of range.
        position: usize,
    },

    /// A cycle was detected while recursively resolving a `RefBySource` chain.
    #[error("corrupt reference chain detected at collection '{0}'")]
    CorruptReferenceError(String),

    /// Underlying filesystem failure during load or save.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure during save or load.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Result type specialized for `rag-store` operations.
pub type Result<T> = std::result::Result<T, RagStoreError>;
