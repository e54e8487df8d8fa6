//! Settlement hash: `H(sorted(canonical(obligation)...) || window_id ||
//! payer || payee)`; both parties must derive identical bytes.

use covenant_core::canonical::canonical_bytes;
use covenant_core::{ContentHash, CovenantError, Identifier, Obligation};
use covenant_crypto::hash::hash_concat;

/// Canonically encodes each obligation, sorts the resulting byte strings
/// (not the structs — sorting bytes removes any ambiguity from field
/// ordering or type-level `Ord` choices), then hashes the concatenation
/// together with `window_id`, `payer`, `payee`.
pub fn settlement_hash(
    obligations: &[Obligation],
    window_id: &str,
    payer: &Identifier,
    payee: &Identifier,
) -> Result<ContentHash, CovenantError> {
    let mut encoded: Vec<Vec<u8>> = obligations.iter().map(canonical_bytes).collect::<Result<_, _>>()?;
    encoded.sort();
    let joined: Vec<u8> = encoded.concat();
    Ok(hash_concat(&[&joined, window_id.as_bytes(), payer.0.as_bytes(), payee.0.as_bytes()]))
}
