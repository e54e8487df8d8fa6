use crate::types::{Amount, Identifier, PublicKey, Timestamp};
use serde::{Deserialize, Serialize};

/// Multi-signature predicate guarding a bond:
/// `MultiSig(k-of-n honest witnesses) ∨ (Timelock(t_refund) → P2PK(owner))`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BondPredicate {
    pub witness_keys: Vec<PublicKey>,
    pub threshold: u32,
    pub refund_locktime: Timestamp,
    pub owner_key: PublicKey,
}

/// A single slash event against a bond.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SlashRecord {
    pub amount: Amount,
    pub reason: String,
    pub slashed_at: Timestamp,
    /// Whether this slash was confirmed by quorum report or by arbitration
    /// supermajority.
    pub via_arbitration: bool,
}

/// Lifecycle of a bond: `Posted → Active → (Refunded ∥ Forfeited)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondStatus {
    Active,
    SlashedPartial,
    Refunded,
    Forfeited,
}

/// Trust tier derived from reputation, bond, tenure, and dispute history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Newcomer,
    Recognized,
    Trusted,
    Senior,
    Founding,
}

/// A posted bond.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bond {
    pub owner: Identifier,
    pub amount: Amount,
    pub predicate: BondPredicate,
    pub slash_log: Vec<SlashRecord>,
    pub status: BondStatus,
    pub posted_at: Timestamp,
    pub tenure_days: u32,
    pub reputation: f64,
    pub dispute_losses: u32,
    #[serde(default)]
    pub tier: Option<Tier>,
}

impl Bond {
    pub fn total_slashed(&self) -> Amount {
        self.slash_log.iter().map(|s| s.amount).sum()
    }

    pub fn remaining(&self) -> Amount {
        self.amount.saturating_sub(self.total_slashed())
    }
}
