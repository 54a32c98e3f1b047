//! Content keys for passage deduplication.
//!
//! Two passages are the same passage when their trimmed text is identical, regardless of which
//! retriever or file produced them. Keys are full 256-bit BLAKE3 digests so the fuser can keep a
//! compact `HashSet` of seen passages without holding a second copy of every text.

/// Dedup key of a passage: BLAKE3 over the trimmed text.
#[inline]
pub fn passage_key(text: &str) -> [u8; 32] {
    *blake3::hash(normalize_content(text).as_bytes()).as_bytes()
}

/// Normalized content used for passage identity.
#[inline]
pub fn normalize_content(text: &str) -> &str {
    text.trim()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for short, log-friendly fingerprints (e.g. query ids in tracing spans), never for
/// identity decisions.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Short fingerprint of a query for log correlation.
#[inline]
pub fn query_fingerprint(query: &str) -> u64 {
    hash_to_u64(query.trim().as_bytes())
}
