/// The cross-index compression engine: `compress`/`decompress` over a chunk
/// sequence against a pool of already-stored sequences.
///
/// Three strategies are supported; `RefByIndex` is the default (see the Open
/// Question in spec §9 — decompression always dispatches on the strategy tag
/// recorded alongside the stored data, not the store's current default, so
/// archival `RefBySource` data keeps decompressing correctly).
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::error::{RagStoreError, Result};
use crate::fingerprint::fingerprint;

/// The pool of already-stored (compressed) sequences, keyed by the
/// fingerprint they were stored under (their `collection_id`).
pub type Pool = HashMap<String, Vec<Chunk>>;

/// Which compression strategy a `DatasetStore` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionStrategy {
    /// Identity transform — no deduplication.
    None,
    /// Keyed-sequence strategy: references by `(collection_id, source_key)`.
    ///
    /// The "source" of each stored entry is its stringified position — a
    /// simplification of the keyed-mapping model in spec §4.3 onto this
    /// crate's plain positional `Index`, documented in DESIGN.md.
    RefBySource,
    /// Positional strategy: references by `(collection_id, position)`. Default.
    RefByIndex,
}

impl Default for CompressionStrategy {
    fn default() -> Self {
        CompressionStrategy::RefByIndex
    }
}

/// Compresses `incoming` against `pool` using `strategy`.
pub fn compress(strategy: CompressionStrategy, pool: &Pool, incoming: &[Chunk]) -> Vec<Chunk> {
    match strategy {
        CompressionStrategy::None => incoming.to_vec(),
        CompressionStrategy::RefBySource => compress_ref_by_source(pool, incoming),
        CompressionStrategy::RefByIndex => compress_ref_by_index(pool, incoming),
    }
}

/// Decompresses a stored sequence against `pool` using `strategy`.
pub fn decompress(strategy: CompressionStrategy, pool: &Pool, stored: &[Chunk]) -> Result<Vec<Chunk>> {
    match strategy {
        CompressionStrategy::None => Ok(stored.to_vec()),
        CompressionStrategy::RefBySource => decompress_ref_by_source(pool, stored),
        CompressionStrategy::RefByIndex => decompress_ref_by_index(pool, stored),
    }
}

// ── RefByIndex ──────────────────────────────────────────────────────

fn compress_ref_by_index(pool: &Pool, incoming: &[Chunk]) -> Vec<Chunk> {
    if let Some(existing) = pool.get(&fingerprint(incoming)) {
        return existing.clone();
    }

    // First occurrence wins, biasing references toward earlier-stored
    // collections. Iterate collections in a deterministic order.
    let mut lookup: HashMap<&str, (&str, usize)> = HashMap::new();
    let mut collection_ids: Vec<&String> = pool.keys().collect();
    collection_ids.sort();
    for collection_id in collection_ids {
        let sequence = &pool[collection_id];
        for (position, chunk) in sequence.iter().enumerate() {
            if let Some(projection) = chunk.projection() {
                lookup.entry(projection).or_insert((collection_id, position));
            }
        }
    }

    incoming
        .iter()
        .map(|chunk| {
            // Only Raw chunks are ever replaced by a reference — External
            // chunks are opaque and references are written through unchanged.
            if !matches!(chunk, Chunk::Raw { .. }) {
                return chunk.clone();
            }
            match chunk.projection().and_then(|p| lookup.get(p)) {
                Some((collection_id, position)) => Chunk::ref_by_index(*collection_id, *position),
                None => chunk.clone(),
            }
        })
        .collect()
}

/// `RefByIndex` decompression is one-hop: the target is returned as-is even
/// if it is itself a reference (writers never emit such chains).
fn decompress_ref_by_index(pool: &Pool, stored: &[Chunk]) -> Result<Vec<Chunk>> {
    stored
        .iter()
        .map(|chunk| match chunk {
            Chunk::RefByIndex {
                collection_id,
                position,
            } => {
                let sequence = pool
                    .get(collection_id)
                    .ok_or_else(|| RagStoreError::UnknownCollection(collection_id.clone()))?;
                sequence.get(*position).cloned().ok_or_else(|| {
                    RagStoreError::IndexOutOfRange {
                        collection: collection_id.clone(),
                        position: *position,
                    }
                })
            }
            other => Ok(other.clone()),
        })
        .collect()
}

// ── RefBySource ─────────────────────────────────────────────────────

fn compress_ref_by_source(pool: &Pool, incoming: &[Chunk]) -> Vec<Chunk> {
    if let Some(existing) = pool.get(&fingerprint(incoming)) {
        return existing.clone();
    }

    let mut collection_ids: Vec<&String> = pool.keys().collect();
    collection_ids.sort();

    incoming
        .iter()
        .map(|chunk| {
            if !matches!(chunk, Chunk::Raw { .. }) {
                return chunk.clone();
            }
            for collection_id in &collection_ids {
                let sequence = &pool[*collection_id];
                for (position, existing) in sequence.iter().enumerate() {
                    if matches!(existing, Chunk::Raw { .. }) && existing == chunk {
                        return Chunk::ref_by_source(*collection_id, position.to_string());
                    }
                }
            }
            chunk.clone()
        })
        .collect()
}

/// `RefBySource` decompression recurses through chained references (to be
/// robust when collections are imported across stores), failing with
/// `CorruptReferenceError` if a `(collection_id, source_key)` pair is
/// revisited.
fn decompress_ref_by_source(pool: &Pool, stored: &[Chunk]) -> Result<Vec<Chunk>> {
    stored
        .iter()
        .map(|chunk| resolve_ref_by_source(pool, chunk, &mut HashSet::new()))
        .collect()
}

fn resolve_ref_by_source(
    pool: &Pool,
    chunk: &Chunk,
    visited: &mut HashSet<(String, String)>,
) -> Result<Chunk> {
    match chunk {
        Chunk::RefBySource {
            collection_id,
            source_key,
        } => {
            let key = (collection_id.clone(), source_key.clone());
            if !visited.insert(key) {
                return Err(RagStoreError::CorruptReferenceError(collection_id.clone()));
            }

            let sequence = pool
                .get(collection_id)
                .ok_or_else(|| RagStoreError::UnknownCollection(collection_id.clone()))?;
            let position: usize = source_key.parse().map_err(|_| RagStoreError::UnknownSource {
                collection: collection_id.clone(),
                source: source_key.clone(),
            })?;
            let target = sequence.get(position).ok_or_else(|| RagStoreError::UnknownSource {
                collection: collection_id.clone(),
                source: source_key.clone(),
            })?;

            resolve_ref_by_source(pool, target, visited)
        }
        other => Ok(other.clone()),
    }
}
