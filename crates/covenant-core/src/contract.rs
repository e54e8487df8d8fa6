use crate::types::{Amount, ContentHash, Identifier, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle of a contract: `Proposed → Trial → Active → (Renewed ∥ Terminated)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Proposed,
    Accepted,
    Trial,
    Active,
    Renewed,
    TerminatedReasonable,
    TerminatedForCause,
}

/// `(trialStart, trialEnd, mainStart, mainEnd, notice, autoRenew)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractWindows {
    pub trial_start: Timestamp,
    pub trial_end: Timestamp,
    pub main_start: Timestamp,
    pub main_end: Timestamp,
    pub notice_secs: i64,
    pub auto_renew: bool,
}

/// Pricing terms, left generic since pricing models are not prescribed
/// beyond the data schema. Per-contract performance-bonus thresholds live
/// here, not as core constants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PricingTerms {
    pub base_amount: Amount,
    pub escrow_window_secs: i64,
    #[serde(default)]
    pub performance_bonus_threshold_bp: Option<u32>,
    #[serde(default)]
    pub performance_bonus_amount: Option<Amount>,
}

/// Service-level agreement, left to the contract's own terms.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceLevelAgreement {
    pub terms: serde_json::Value,
}

/// A deterministic-id contract between two hive participants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: ContentHash,
    pub advisor: Identifier,
    pub operator: Identifier,
    pub scope: Vec<String>,
    pub pricing: PricingTerms,
    pub sla: ServiceLevelAgreement,
    pub windows: ContractWindows,
    pub management_credential_ref: ContentHash,
    pub initial_escrow_ticket_id: String,
    pub status: ContractStatus,
    pub advisor_sig: String,
    pub operator_sig: String,
    #[serde(default)]
    pub heartbeat_misses: u32,
}

impl Contract {
    pub fn both_signed(&self) -> bool {
        !self.advisor_sig.is_empty() && !self.operator_sig.is_empty()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ContractStatus::TerminatedReasonable | ContractStatus::TerminatedForCause
        )
    }
}
