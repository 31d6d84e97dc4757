//! Persistent, content-addressed, cross-collection-deduplicating storage for
//! RAG datasets.
//!
//! A caller appends a sequence of [`Chunk`]s (an "index") together with the
//! test-case record it was retrieved for; the crate fingerprints the
//! sequence, compresses it against everything already stored using the
//! configured [`CompressionStrategy`], and persists both the dataset and its
//! paired test cases to disk atomically. [`RAGStore`] is the façade most
//! callers want; [`IndexLogger`] is a narrower front-end for timestamped
//! retrieval-event logging.

mod chunk;
mod compression;
mod config;
mod dataset_store;
mod error;
mod fingerprint;
mod logger;
mod persistence;
mod rag_store;
mod testcase;

pub use chunk::{Chunk, ExternalChunk, Index};
pub use compression::CompressionStrategy;
pub use config::RagStoreConfig;
pub use error::{RagStoreError, Result};
pub use fingerprint::fingerprint;
pub use logger::{IndexLogger, LogEntry};
pub use rag_store::RAGStore;
pub use testcase::Testcase;
