use crate::types::{Amount, Identifier, Seq, Timestamp, WindowId};
use serde::{Deserialize, Serialize};

/// What accrued the obligation, e.g. "per action billed" and "completed
/// performance milestone".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    PerAction,
    PerformanceMilestone,
    Custom(String),
}

/// Lifecycle of an obligation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    Pending,
    Netted,
    Settled,
    Disputed,
}

/// An append-only obligation entry: `(window, from, to, kind, ref)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Obligation {
    pub window_id: WindowId,
    pub from: Identifier,
    pub to: Identifier,
    pub kind: ObligationKind,
    pub reference: String,
    pub amount: Amount,
    pub receipt_id: Seq,
    pub status: ObligationStatus,
}

impl Obligation {
    pub fn key(&self) -> (WindowId, Identifier, Identifier, String, String) {
        (
            self.window_id.clone(),
            self.from.clone(),
            self.to.clone(),
            format!("{:?}", self.kind),
            self.reference.clone(),
        )
    }
}

/// The day-bucket settlement window containing `now`, shared by obligation
/// extraction and the orchestrator's window-close job so both agree on
/// window boundaries.
pub fn daily_window_id(now: Timestamp) -> WindowId {
    (now / 86_400).to_string()
}
