/// Configuration for a [`crate::RAGStore`] or [`crate::IndexLogger`].
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::compression::CompressionStrategy;

/// Knobs governing where a store's files live and how it deduplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagStoreConfig {
    /// Directory the dataset and testcase files are written under.
    pub cache_dir: PathBuf,
    /// Logical name of the dataset; becomes the file name stem.
    pub name: String,
    /// Compression strategy used for newly created stores.
    #[serde(default)]
    pub strategy: CompressionStrategy,
}

impl RagStoreConfig {
    /// A config pointing at `name` under `cache_dir`, using the default
    /// compression strategy.
    pub fn new(name: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            name: name.into(),
            strategy: CompressionStrategy::default(),
        }
    }

    /// Overrides the compression strategy.
    pub fn with_strategy(mut self, strategy: CompressionStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}
