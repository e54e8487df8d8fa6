use crate::canonical::canonical_bytes;
use crate::error::CovenantError;
use crate::operation::OperationEnvelope;
use crate::types::{ContentHash, Seq};
use serde::{Deserialize, Serialize};

/// Result of executing an operation: `success` or `failure(<reason>)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionResult {
    Success,
    Failure { reason: String },
}

/// A dually-signed, hash-chained receipt record. `prev` is the `blake3`
/// hash of the canonical encoding of the previous receipt; `self_hash` is
/// this receipt's own canonical hash, used as the next entry's `prev`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Receipt {
    pub seq: Seq,
    pub prev: ContentHash,
    pub op: OperationEnvelope,
    pub state_before: ContentHash,
    pub state_after: ContentHash,
    pub result: ExecutionResult,
    pub ts: String,
    pub issuer_sig: String,
    pub node_sig: String,
}

/// The canonical form hashed to produce `self_hash` / the next receipt's
/// `prev` — a canonical form that includes `prev`, making the chain
/// tamper-evident.
#[derive(Serialize)]
struct ReceiptCanonical<'a> {
    seq: Seq,
    prev: &'a ContentHash,
    op: &'a OperationEnvelope,
    state_before: &'a ContentHash,
    state_after: &'a ContentHash,
    result: &'a ExecutionResult,
    ts: &'a str,
}

impl Receipt {
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CovenantError> {
        canonical_bytes(&ReceiptCanonical {
            seq: self.seq,
            prev: &self.prev,
            op: &self.op,
            state_before: &self.state_before,
            state_after: &self.state_after,
            result: &self.result,
            ts: &self.ts,
        })
    }

    pub fn self_hash(&self) -> Result<ContentHash, CovenantError> {
        Ok(ContentHash::from_bytes(&self.canonical_bytes()?))
    }

    /// Node-side signing payload: the canonical form including `prev`.
    pub fn node_signing_bytes(&self) -> Result<Vec<u8>, CovenantError> {
        self.canonical_bytes()
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, ExecutionResult::Success)
    }
}

/// Verifies the universal chain invariant:
/// `receipt[i].prev == H(canonical(receipt[i-1]))`.
pub fn verify_chain(receipts: &[Receipt]) -> Result<(), CovenantError> {
    for pair in receipts.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let expected = prev.self_hash()?;
        if next.prev != expected {
            return Err(CovenantError::Other(format!(
                "chain broken at seq {}: expected prev {}, got {}",
                next.seq, expected, next.prev
            )));
        }
        if next.seq != prev.seq + 1 {
            return Err(CovenantError::Other(format!(
                "sequence gap: {} -> {}",
                prev.seq, next.seq
            )));
        }
    }
    Ok(())
}

/// A periodic Merkle-summary credential over
/// `(subject, window, count, merkle_root)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MerkleSummary {
    pub subject: String,
    pub window_start_seq: Seq,
    pub window_end_seq: Seq,
    pub count: u64,
    pub merkle_root: ContentHash,
    pub emitted_at: i64,
}

/// Computes a Merkle root over a contiguous receipt range, used by
/// `merkle_root(range)` and periodic summary export.
pub fn merkle_root(receipts: &[Receipt]) -> Result<ContentHash, CovenantError> {
    if receipts.is_empty() {
        return Ok(ContentHash::genesis());
    }
    let mut layer: Vec<ContentHash> = receipts
        .iter()
        .map(|r| r.self_hash())
        .collect::<Result<_, _>>()?;
    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        for pair in layer.chunks(2) {
            let combined = if pair.len() == 2 {
                [pair[0].0, pair[1].0].concat()
            } else {
                [pair[0].0, pair[0].0].concat()
            };
            next.push(ContentHash::from_bytes(&combined));
        }
        layer = next;
    }
    Ok(layer[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationEnvelope;
    use crate::types::Identifier;
    use serde_json::json;

    fn op(nonce: u64) -> OperationEnvelope {
        OperationEnvelope {
            schema: "fee-policy/v1".into(),
            action: "set_anchor".into(),
            params: json!({}),
            issuer: Identifier::new("advisor-1"),
            nonce,
            ts: "2026-01-01T00:00:00Z".into(),
            credential_ref: ContentHash::genesis(),
            sig: String::new(),
        }
    }

    fn receipt(seq: u64, prev: ContentHash) -> Receipt {
        Receipt {
            seq,
            prev,
            op: op(seq),
            state_before: ContentHash::genesis(),
            state_after: ContentHash::genesis(),
            result: ExecutionResult::Success,
            ts: "2026-01-01T00:00:00Z".into(),
            issuer_sig: "ab".into(),
            node_sig: "cd".into(),
        }
    }

    #[test]
    fn chain_links_correctly() {
        let r1 = receipt(1, ContentHash::genesis());
        let h1 = r1.self_hash().unwrap();
        let r2 = receipt(2, h1);
        assert!(verify_chain(&[r1, r2]).is_ok());
    }

    #[test]
    fn broken_chain_is_detected() {
        let r1 = receipt(1, ContentHash::genesis());
        let r2 = receipt(2, ContentHash::genesis());
        assert!(verify_chain(&[r1, r2]).is_err());
    }
}
