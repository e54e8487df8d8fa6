//! JSON-RPC 2.0 server exposing the programmatic API: `submit`,
//! `issue_credential`, `revoke_credential`, `open_contract`, `close_window`,
//! `dispute`, `get_receipt`, `get_network_info`.

pub mod api;
pub mod server;
pub mod types;

pub use api::{CovenantApiClient, CovenantApiServer};
pub use server::{RpcServer, RpcServerState};
pub use types::{
    RpcCloseWindowResult, RpcContractOpenRequest, RpcCredentialRef, RpcDisputeRequest,
    RpcIssueCredentialRequest, RpcNetPayment, RpcNetworkInfo, RpcReceipt, RpcSubmitResult,
};
