use covenant_core::{ManagementCredential, OperationEnvelope, Receipt};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcSubmitResult {
    pub executed: bool,
    pub receipt_seq: Option<u64>,
    pub kind: Option<String>,
    pub detail: Option<String>,
}

impl From<covenant_core::SubmitOutcome> for RpcSubmitResult {
    fn from(outcome: covenant_core::SubmitOutcome) -> Self {
        match outcome {
            covenant_core::SubmitOutcome::Executed { receipt_seq } => {
                RpcSubmitResult { executed: true, receipt_seq: Some(receipt_seq), kind: None, detail: None }
            }
            covenant_core::SubmitOutcome::Rejected { kind, detail } => {
                RpcSubmitResult { executed: false, receipt_seq: None, kind: Some(kind), detail: Some(detail) }
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcIssueCredentialRequest {
    pub credential: ManagementCredential,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcCredentialRef {
    pub content_hash_hex: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcContractOpenRequest {
    pub negotiation_id: String,
    pub advisor: String,
    pub operator: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcCloseWindowResult {
    pub window_id: String,
    pub net_payments: Vec<RpcNetPayment>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcNetPayment {
    pub from: String,
    pub to: String,
    pub amount: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcDisputeRequest {
    pub dispute_id: String,
    pub window_id: String,
    pub claimant: String,
    pub respondent: String,
    pub filed_at: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcReceipt {
    pub receipt: Receipt,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcNetworkInfo {
    pub node_version: String,
    pub peer_multiaddr: Option<String>,
}
