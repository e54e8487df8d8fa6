use crate::canonical::canonical_bytes;
use crate::error::CovenantError;
use crate::types::{ContentHash, Identifier, Nonce, Timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The operation envelope. `sig` is computed over the canonical encoding
/// of every other field in the order
/// `schema|action|params|issuer|nonce|ts|credential_ref`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OperationEnvelope {
    pub schema: String,
    pub action: String,
    pub params: serde_json::Value,
    pub issuer: Identifier,
    pub nonce: Nonce,
    pub ts: String,
    pub credential_ref: ContentHash,
    pub sig: String,
}

/// The subset of the envelope that is signed over, in canonical form
/// (`schema|action|params|issuer|nonce|ts|credential_ref`).
#[derive(Serialize)]
struct SignedPayload<'a> {
    schema: &'a str,
    action: &'a str,
    params: &'a serde_json::Value,
    issuer: &'a Identifier,
    nonce: Nonce,
    ts: &'a str,
    credential_ref: &'a ContentHash,
}

impl OperationEnvelope {
    pub fn canonical_signing_bytes(&self) -> Result<Vec<u8>, CovenantError> {
        canonical_bytes(&SignedPayload {
            schema: &self.schema,
            action: &self.action,
            params: &self.params,
            issuer: &self.issuer,
            nonce: self.nonce,
            ts: &self.ts,
            credential_ref: &self.credential_ref,
        })
    }

    /// Parses `ts` as an ISO-8601 UTC timestamp into unix seconds.
    pub fn timestamp_unix(&self) -> Result<Timestamp, CovenantError> {
        DateTime::parse_from_rfc3339(&self.ts)
            .map(|dt| dt.with_timezone(&Utc).timestamp())
            .map_err(|e| CovenantError::MalformedEnvelope(format!("bad ts: {e}")))
    }

    /// `|now - ts| <= max_skew`.
    pub fn within_skew(&self, now: Timestamp, max_skew: i64) -> Result<bool, CovenantError> {
        let ts = self.timestamp_unix()?;
        Ok((now - ts).abs() <= max_skew)
    }
}

/// A single linear pipeline stage an operation has progressed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStage {
    Received,
    Parsed,
    VerifiedReplay,
    VerifiedCredential,
    VerifiedScope,
    PolicyAdmitted,
    PolicyQueued,
    PolicyResolved,
    Executed,
    ReceiptAppended,
    ObligationAppended,
}

/// The outcome of `submit(op_envelope)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SubmitOutcome {
    Executed { receipt_seq: u64 },
    Rejected { kind: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope() -> OperationEnvelope {
        OperationEnvelope {
            schema: "fee-policy/v1".into(),
            action: "set_anchor".into(),
            params: json!({"channel": "X", "fee_ppm": 150}),
            issuer: Identifier::new("advisor-1"),
            nonce: 1,
            ts: "2026-01-01T00:00:00Z".into(),
            credential_ref: ContentHash::genesis(),
            sig: String::new(),
        }
    }

    #[test]
    fn canonical_signing_bytes_are_stable() {
        let env = envelope();
        let a = env.canonical_signing_bytes().unwrap();
        let b = env.canonical_signing_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn skew_boundary_300_accepts_301_rejects() {
        let env = envelope();
        let ts = env.timestamp_unix().unwrap();
        assert!(env.within_skew(ts + 300, 300).unwrap());
        assert!(!env.within_skew(ts + 301, 300).unwrap());
    }
}
