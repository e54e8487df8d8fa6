//! Dispute and arbitration: evidence exchange, deterministic panel
//! selection, vote tallying and bilateral-cooling fallback.

pub mod manager;
pub mod outcome;
pub mod selection;
pub mod types;

pub use manager::{DisputeManager, NonVoter};
pub use outcome::tally;
pub use selection::{panel_seed, select};
pub use types::{DisputeCase, DisputeOutcome, DisputeStatus, EvidenceRange, Vote};
