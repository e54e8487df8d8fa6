use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use covenant_core::OperationEnvelope;

use crate::types::{
    RpcCloseWindowResult, RpcContractOpenRequest, RpcCredentialRef, RpcDisputeRequest,
    RpcIssueCredentialRequest, RpcNetworkInfo, RpcReceipt, RpcSubmitResult,
};

/// The Covenant programmatic API: submit, issue_credential, revoke_credential,
/// open_contract, close_window, dispute, get_receipt, get_network_info. All
/// method names are prefixed with "covenant_" via `namespace = "covenant"`.
#[rpc(server, client, namespace = "covenant")]
pub trait CovenantApi {
    /// Runs the full credential-gated command pipeline (C1-C6) over a
    /// signed operation envelope.
    #[method(name = "submit")]
    async fn submit(&self, envelope: OperationEnvelope) -> RpcResult<RpcSubmitResult>;

    /// Persists a management credential, keyed by its content hash.
    #[method(name = "issueCredential")]
    async fn issue_credential(&self, request: RpcIssueCredentialRequest) -> RpcResult<RpcCredentialRef>;

    /// Marks a credential revoked, immediate and fail-closed for every
    /// subsequent lookup.
    #[method(name = "revokeCredential")]
    async fn revoke_credential(&self, content_hash_hex: String) -> RpcResult<()>;

    /// Opens a new bilateral contract negotiation.
    #[method(name = "openContract")]
    async fn open_contract(&self, request: RpcContractOpenRequest) -> RpcResult<()>;

    /// Closes a settlement window, running the netting engine and returning
    /// the resulting net payment set.
    #[method(name = "closeWindow")]
    async fn close_window(&self, window_id: String) -> RpcResult<RpcCloseWindowResult>;

    /// Files a dispute, selecting its panel (or falling back to bilateral
    /// cooling) deterministically.
    #[method(name = "dispute")]
    async fn dispute(&self, request: RpcDisputeRequest) -> RpcResult<()>;

    /// Fetches a single receipt by sequence index.
    #[method(name = "getReceipt")]
    async fn get_receipt(&self, seq: u64) -> RpcResult<Option<RpcReceipt>>;

    /// Returns this node's transport identity, if a transport is attached.
    #[method(name = "getNetworkInfo")]
    async fn get_network_info(&self) -> RpcResult<RpcNetworkInfo>;
}
