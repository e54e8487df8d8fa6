//! Dispute entities.

use covenant_consensus::EligibleMember;
use covenant_core::{Amount, ContentHash, Identifier, Seq, Signature, Timestamp, WindowId};
use serde::{Deserialize, Serialize};

/// A signed receipt-range exchanged by both parties covering the disputed
/// window.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvidenceRange {
    pub party: Identifier,
    pub seq_start: Seq,
    pub seq_end: Seq,
    pub signature: Signature,
}

/// A panel member's signed vote over the disputed amount and optional
/// slashing recommendation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vote {
    pub member: Identifier,
    pub amount: Amount,
    pub slash_recommended: bool,
    pub cast_at: Timestamp,
    pub signature: Signature,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    EvidenceExchange,
    PanelSelected,
    Voting,
    Resolved,
    BilateralCooling,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisputeOutcome {
    pub amount: Amount,
    pub slash_recommended: bool,
}

/// A single dispute case. Identity is
/// `dispute_id`, which is caller-assigned (e.g. a content hash of the
/// triggering disagreement).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisputeCase {
    pub dispute_id: String,
    pub window_id: WindowId,
    pub claimant: Identifier,
    pub respondent: Identifier,
    pub filed_at: Timestamp,
    pub block_hash_at_filing: ContentHash,
    pub evidence: Vec<EvidenceRange>,
    pub panel: Vec<EligibleMember>,
    pub votes: Vec<Vote>,
    pub status: DisputeStatus,
    pub outcome: Option<DisputeOutcome>,
}
