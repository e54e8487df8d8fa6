//! Deterministic canonical encoding: sorted object keys, no
//! insignificant whitespace, UTF-8, arrays preserving insertion order,
//! integers as decimal without leading zeros, byte strings as lower-case hex.
//!
//! `serde_json::Map` is a `BTreeMap` by default (this workspace never enables
//! the `preserve_order` feature), so a plain compact `serde_json::to_vec`
//! already yields sorted keys, ordered arrays and leading-zero-free integers.
//! Byte strings are the caller's responsibility to lower-case-hex-encode
//! before placing them in the `Value` tree — see [`hex_lower`].

use crate::error::CovenantError;
use crate::types::ContentHash;
use serde::Serialize;
use serde_json::Value;

/// Lower-case hex encoding, the only byte-string representation allowed in
/// canonical structures.
pub fn hex_lower(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Serializes `value` to its canonical JSON byte representation.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CovenantError> {
    let v: Value = serde_json::to_value(value)
        .map_err(|e| CovenantError::Serialization(e.to_string()))?;
    serde_json::to_vec(&v).map_err(|e| CovenantError::Serialization(e.to_string()))
}

/// Convenience wrapper returning the canonical string form.
pub fn canonical_string<T: Serialize>(value: &T) -> Result<String, CovenantError> {
    Ok(String::from_utf8(canonical_bytes(value)?).expect("canonical JSON is UTF-8"))
}

/// Hashes the canonical encoding of `value` with `blake3`.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<ContentHash, CovenantError> {
    Ok(ContentHash::from_bytes(&canonical_bytes(value)?))
}
