use crate::types::{Amount, HashLock, Identifier, PublicKey, Timestamp};
use serde::{Deserialize, Serialize};

/// Terminal/non-terminal state of an escrow ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowState {
    Active,
    Redeemed,
    Refunded,
    Expired,
}

impl EscrowState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EscrowState::Active)
    }
}

/// Which escrow-ticket variant this is: simple, batch, milestone, or
/// performance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EscrowVariant {
    /// A single `P2PK ∧ HashLock ∧ Timelock` token.
    Simple,
    /// N tokens sharing `(payee, t)` but with distinct hash locks, indexed
    /// `0..n`.
    Batch { index: u32, of: u32 },
    /// N tokens of possibly-increasing value released on independent
    /// checkpoints.
    Milestone { checkpoint: u32, of: u32 },
    /// A base ticket (unconditional on delivery) paired with a bonus ticket
    /// whose secret is revealed only if a metric crosses a per-contract
    /// threshold within a measurement window.
    Performance {
        is_bonus: bool,
        bonus_threshold_bp: Option<u32>,
        measurement_window_end: Option<Timestamp>,
    },
}

/// The structured `P2PK(payee) ∧ HashLock(h) ∧ (Timelock(t) → P2PK(payer))`
/// spending condition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpendingCondition {
    pub nonce: String,
    pub payee_pubkey: PublicKey,
    pub hash: HashLock,
    pub locktime: Timestamp,
    pub refund_pubkey: PublicKey,
    pub sigflag: String,
}

impl SpendingCondition {
    /// Renders the `["P2PK", {...}]` wire form.
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!([
            "P2PK",
            {
                "nonce": self.nonce,
                "data": hex::encode(&self.payee_pubkey.0),
                "tags": [
                    ["hash", hex::encode(self.hash.0)],
                    ["locktime", self.locktime.to_string()],
                    ["refund", hex::encode(&self.refund_pubkey.0)],
                    ["sigflag", self.sigflag],
                ]
            }
        ])
    }
}

/// A conditional bearer token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EscrowTicket {
    pub ticket_id: String,
    pub payer: Identifier,
    pub payee: Identifier,
    pub amount: Amount,
    pub condition: SpendingCondition,
    pub backing_token: String,
    pub state: EscrowState,
    pub variant: EscrowVariant,
    pub issued_at: Timestamp,
    #[serde(default)]
    pub redeemed_at: Option<Timestamp>,
    #[serde(default)]
    pub refunded_at: Option<Timestamp>,
    /// References the `Receipt` (if any) this ticket's amount was priced
    /// against.
    #[serde(default)]
    pub priced_from_receipt: Option<u64>,
}

impl EscrowTicket {
    pub fn locktime(&self) -> Timestamp {
        self.condition.locktime
    }

    /// `t - 1s` still allows redemption; `t + 0s` only allows reclaim.
    pub fn redeemable_at(&self, now: Timestamp) -> bool {
        self.state == EscrowState::Active && now < self.locktime()
    }

    pub fn reclaimable_at(&self, now: Timestamp) -> bool {
        self.state == EscrowState::Active && now >= self.locktime()
    }
}

/// The hash-lock preimage, stored encrypted at rest and revealed at most
/// once.
#[derive(Clone, Serialize, Deserialize)]
pub struct Secret {
    pub ticket_id: String,
    pub preimage: Vec<u8>,
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(ticket_id={})", self.ticket_id)
    }
}

impl Secret {
    pub fn hash_lock(&self) -> HashLock {
        HashLock(*blake3::hash(&self.preimage).as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_locktime_redeemable_then_reclaimable() {
        let cond = SpendingCondition {
            nonce: "n".into(),
            payee_pubkey: PublicKey(vec![1]),
            hash: HashLock([0u8; 32]),
            locktime: 1000,
            refund_pubkey: PublicKey(vec![2]),
            sigflag: "SIG_ALL".into(),
        };
        let t = EscrowTicket {
            ticket_id: "t1".into(),
            payer: Identifier::new("payer"),
            payee: Identifier::new("payee"),
            amount: 5000,
            condition: cond,
            backing_token: "tok".into(),
            state: EscrowState::Active,
            variant: EscrowVariant::Simple,
            issued_at: 0,
            redeemed_at: None,
            refunded_at: None,
            priced_from_receipt: None,
        };
        assert!(t.redeemable_at(999));
        assert!(!t.reclaimable_at(999));
        assert!(!t.redeemable_at(1000));
        assert!(t.reclaimable_at(1000));
    }

    #[test]
    fn secret_hash_matches_condition() {
        let secret = Secret { ticket_id: "t1".into(), preimage: b"hello".to_vec() };
        assert_eq!(secret.hash_lock().0, *blake3::hash(b"hello").as_bytes());
    }
}
