//! Obligation Ledger (C8): append-only `(window_id, from, to, kind, amount,
//! receipt_id, status)` entries.

use covenant_core::{CovenantError, Obligation, ObligationStatus, WindowId};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct ObligationLedger {
    by_window: RwLock<HashMap<WindowId, Vec<Obligation>>>,
}

impl ObligationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, obligation: Obligation) {
        self.by_window
            .write()
            .unwrap()
            .entry(obligation.window_id.clone())
            .or_default()
            .push(obligation);
    }

    pub fn window(&self, window_id: &str) -> Vec<Obligation> {
        self.by_window.read().unwrap().get(window_id).cloned().unwrap_or_default()
    }

    /// Marks every `Pending` obligation in `window_id` as `Netted`, as the
    /// Netting Engine commits a result for the window.
    pub fn mark_netted(&self, window_id: &str) -> Result<(), CovenantError> {
        let mut by_window = self.by_window.write().unwrap();
        let entries = by_window
            .get_mut(window_id)
            .ok_or_else(|| CovenantError::NotFound(format!("window {window_id}")))?;
        for o in entries.iter_mut() {
            if o.status == ObligationStatus::Pending {
                o.status = ObligationStatus::Netted;
            }
        }
        Ok(())
    }

    pub fn mark_settled(&self, window_id: &str) -> Result<(), CovenantError> {
        let mut by_window = self.by_window.write().unwrap();
        let entries = by_window
            .get_mut(window_id)
            .ok_or_else(|| CovenantError::NotFound(format!("window {window_id}")))?;
        for o in entries.iter_mut() {
            if o.status == ObligationStatus::Netted {
                o.status = ObligationStatus::Settled;
            }
        }
        Ok(())
    }

    pub fn mark_disputed(&self, window_id: &str, from: &covenant_core::Identifier, to: &covenant_core::Identifier) {
        if let Some(entries) = self.by_window.write().unwrap().get_mut(window_id) {
            for o in entries.iter_mut() {
                if &o.from == from && &o.to == to {
                    o.status = ObligationStatus::Disputed;
                }
            }
        }
    }
}
