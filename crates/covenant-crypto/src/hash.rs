use covenant_core::ContentHash;

/// `blake3` hash of arbitrary bytes.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// `H(secret)` as used for escrow hash-locks and settlement/panel-selection
/// hashes.
pub fn content_hash(data: &[u8]) -> ContentHash {
    ContentHash::from_bytes(data)
}

/// `H(a || b)`, used for `settlement_hash` and the dispute panel-selection
/// `seed`: both are `H(x || y)` of two byte strings.
pub fn hash_concat(parts: &[&[u8]]) -> ContentHash {
    let mut hasher = blake3::Hasher::new();
    for p in parts {
        hasher.update(p);
    }
    ContentHash(*hasher.finalize().as_bytes())
}
