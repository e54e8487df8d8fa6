//! Obligation Ledger (C8) and Netting Engine (C9).

pub mod agreement;
pub mod hash;
pub mod ledger;
pub mod netting;

pub use agreement::{AgreementOutcome, AgreementTracker, Disagreement};
pub use hash::settlement_hash;
pub use ledger::ObligationLedger;
pub use netting::{bilateral_net, multilateral_net, NetPayment};
