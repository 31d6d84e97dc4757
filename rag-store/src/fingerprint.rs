/// Deterministic, order-independent fingerprinting of chunk sequences.
///
/// Each element's canonical projection is hashed independently and the
/// per-element hashes are combined with XOR, so the result only depends on
/// the *set* of chunk identities, not their order. Duplicate elements
/// XOR-cancel in pairs — an accepted collision for this dedup use case,
/// since false positives are resolved by key collision in the store map.
///
/// Hashed with SHA-256 rather than `std`'s `DefaultHasher`: this fingerprint
/// is persisted as a store key, and std explicitly does not guarantee
/// `DefaultHasher`'s output is stable across compiler releases, which would
/// violate spec property 1 (determinism "across runs and processes").
use sha2::{Digest, Sha256};

use crate::chunk::Chunk;

/// Computes the 16-hex-character fingerprint of a chunk sequence.
///
/// The empty sequence returns the literal string `"0"`.
pub fn fingerprint(sequence: &[Chunk]) -> String {
    if sequence.is_empty() {
        return "0".to_string();
    }

    let mut accumulator: u64 = 0;
    for chunk in sequence {
        accumulator ^= element_hash(chunk);
    }
    format!("{accumulator:016x}")
}

/// Hashes a single chunk's canonical projection.
///
/// Reference chunks are never fingerprint input in practice (compression
/// never emits a reference for data the caller is fingerprinting pre-store),
/// but if one is present its coordinates are hashed so the function stays
/// total over `Chunk`.
fn element_hash(chunk: &Chunk) -> u64 {
    let mut hasher = Sha256::new();
    match chunk.projection() {
        Some(projection) => hasher.update(projection.as_bytes()),
        None => {
            // Reference chunks: hash their coordinates instead of a projection.
            match chunk {
                Chunk::RefBySource {
                    collection_id,
                    source_key,
                } => {
                    hasher.update(collection_id.as_bytes());
                    hasher.update(source_key.as_bytes());
                }
                Chunk::RefByIndex {
                    collection_id,
                    position,
                } => {
                    hasher.update(collection_id.as_bytes());
                    hasher.update(position.to_le_bytes());
                }
                _ => unreachable!("projection() is None only for reference chunks"),
            }
        }
    }
    let digest = hasher.finalize();
    u64::from_be_bytes(digest[..8].try_into().expect("sha256 digest is 32 bytes"))
}
