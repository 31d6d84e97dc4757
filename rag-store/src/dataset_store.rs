/// `DatasetStore` — a mapping `fingerprint → compressed chunk sequence`,
/// deduplicating cross-index content via the configured compression
/// strategy.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::compression::{self, CompressionStrategy, Pool};
use crate::error::{RagStoreError, Result};
use crate::fingerprint::fingerprint;
use crate::persistence;

/// On-disk shape of a `DatasetStore`. Readers accept either the current
/// `chunks` field name or the legacy `indexes` name; writers always emit
/// `chunks`.
#[derive(Debug, Serialize, Deserialize)]
struct DatasetFile {
    #[serde(alias = "indexes")]
    chunks: Pool,
    #[serde(default)]
    compression: CompressionStrategy,
}

/// A mapping `fingerprint → compressed chunk sequence` plus a chosen
/// compression strategy.
///
/// Invariants (spec §4.4): every key equals the fingerprint of the
/// *original* (pre-compression) sequence; reference chunks stored in any
/// sequence only point to keys present in the store at decompression time.
pub struct DatasetStore {
    path: PathBuf,
    strategy: CompressionStrategy,
    entries: Pool,
}

impl DatasetStore {
    /// Creates an empty store at `path` with the given compression strategy.
    pub fn new(path: PathBuf, strategy: CompressionStrategy) -> Self {
        Self {
            path,
            strategy,
            entries: Pool::new(),
        }
    }

    /// Loads a store from `path`, or returns an empty one if the file does
    /// not exist. `default_strategy` is used only when the file is absent.
    pub async fn load(path: PathBuf, default_strategy: CompressionStrategy) -> Result<Self> {
        match persistence::load::<DatasetFile>(&path).await? {
            Some(file) => Ok(Self {
                path,
                strategy: file.compression,
                entries: file.chunks,
            }),
            None => Ok(Self::new(path, default_strategy)),
        }
    }

    /// The compression strategy this store is configured with. Decompression
    /// always uses the strategy recorded in the loaded file, not necessarily
    /// this value (relevant only to newly-appended data).
    pub fn strategy(&self) -> CompressionStrategy {
        self.strategy
    }

    /// Appends `sequence`, storing it compressed against the existing pool
    /// under `fingerprint(sequence)`. Idempotent: appending an
    /// element-for-element-equal sequence again overwrites the same key with
    /// an equivalent compressed form and leaves one entry. Saves the dataset
    /// file (not the companion testcase file).
    pub async fn append(&mut self, sequence: Vec<Chunk>) -> Result<String> {
        let id = fingerprint(&sequence);
        let compressed = compression::compress(self.strategy, &self.entries, &sequence);
        self.entries.insert(id.clone(), compressed);
        self.save().await?;
        tracing::info!(id = %id, len = sequence.len(), "appended dataset entry");
        Ok(id)
    }

    /// Looks up the compressed sequence under `id` and decompresses it
    /// against the pool. Fails with `KeyNotFound` if `id` is absent.
    pub fn get(&self, id: &str) -> Result<Vec<Chunk>> {
        let stored = self
            .entries
            .get(id)
            .ok_or_else(|| RagStoreError::KeyNotFound(id.to_string()))?;
        compression::decompress(self.strategy, &self.entries, stored)
    }

    /// Whether an entry exists under `id`, without decompressing it.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    async fn save(&self) -> Result<()> {
        let file = DatasetFile {
            chunks: self.entries.clone(),
            compression: self.strategy,
        };
        persistence::save(&self.path, &file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;

    fn store(dir: &std::path::Path) -> DatasetStore {
        DatasetStore::new(dir.join("dataset.json"), CompressionStrategy::RefByIndex)
    }

    #[tokio::test]
    async fn append_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(dir.path());
        let seq = vec![Chunk::raw("A"), Chunk::raw("B")];

        let id = store.append(seq.clone()).await.unwrap();
        assert_eq!(store.get(&id).unwrap(), seq);
    }

    #[tokio::test]
    async fn append_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(dir.path());
        let seq = vec![Chunk::raw("A"), Chunk::raw("B")];

        let id1 = store.append(seq.clone()).await.unwrap();
        let id2 = store.append(seq.clone()).await.unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.get(&id1).unwrap(), seq);
    }

    #[tokio::test]
    async fn get_missing_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let err = store.get("does-not-exist").unwrap_err();
        assert!(matches!(err, RagStoreError::KeyNotFound(_)));
    }

    #[tokio::test]
    async fn empty_sequence_gets_fingerprint_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(dir.path());

        let id = store.append(vec![]).await.unwrap();
        assert_eq!(id, "0");
        assert_eq!(store.get("0").unwrap(), Vec::<Chunk>::new());
    }

    #[tokio::test]
    async fn repeated_sequence_keeps_a_single_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(dir.path());

        let s1 = vec![Chunk::raw("alpha"), Chunk::raw("beta")];
        let s2 = vec![Chunk::raw("alpha"), Chunk::raw("beta")];

        let id1 = store.append(s1.clone()).await.unwrap();
        let id2 = store.append(s2.clone()).await.unwrap();

        assert_eq!(id1, id2);
        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.get(&id1).unwrap(), s1);
    }

    #[tokio::test]
    async fn overlapping_content_across_indices_is_stored_by_reference() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(dir.path());

        let s1 = vec![Chunk::raw("alpha"), Chunk::raw("beta")];
        let s2 = vec![Chunk::raw("alpha"), Chunk::raw("gamma")];

        let id1 = store.append(s1.clone()).await.unwrap();
        let id2 = store.append(s2.clone()).await.unwrap();

        assert_ne!(id1, id2);
        let stored_s2 = store.entries.get(&id2).unwrap();
        assert!(stored_s2[0].is_reference(), "shared chunk should be a reference");
        assert!(!stored_s2[1].is_reference(), "unique chunk should stay raw");
        assert_eq!(store.get(&id2).unwrap(), s2);
    }

    #[tokio::test]
    async fn persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let seq = vec![Chunk::raw("A")];
        let id;
        {
            let mut store = DatasetStore::new(path.clone(), CompressionStrategy::RefByIndex);
            id = store.append(seq.clone()).await.unwrap();
        }

        let reloaded = DatasetStore::load(path, CompressionStrategy::RefByIndex)
            .await
            .unwrap();
        assert_eq!(reloaded.get(&id).unwrap(), seq);
    }

    #[tokio::test]
    async fn loads_legacy_field_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");

        let legacy = serde_json::json!({
            "indexes": {"abc": [{"kind": "raw", "text": "legacy"}]},
            "compression": "ref_by_index",
        });
        tokio::fs::write(&path, serde_json::to_vec(&legacy).unwrap())
            .await
            .unwrap();

        let store = DatasetStore::load(path, CompressionStrategy::RefByIndex)
            .await
            .unwrap();
        assert_eq!(store.get("abc").unwrap(), vec![Chunk::raw("legacy")]);
    }
}
