//! Deterministic weighted eligibility sampling and quorum-threshold helpers
//! shared by the dispute panel (C10) and the netting agreement protocol
//! (C9).

pub mod panel;
pub mod quorum;

pub use panel::{panel_shape, select_panel, EligibleMember, PanelShape};
pub use quorum::{supermajority, QuorumTracker};
