//! Bond Manager (C11): multi-signature-guarded bond issuance, slashing,
//! refund, and tier derivation.

pub mod manager;
pub mod slash;
pub mod tier;

pub use manager::BondManager;
pub use slash::{arbitration_authorizes_slash, slash_quantum, ViolationReportTracker};
pub use tier::{effective_weight, new_member_minimum};
