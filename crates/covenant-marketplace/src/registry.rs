//! Active-contract registry: heartbeat tracking and 3-miss termination for
//! contracts past formation (C14 heartbeat job).

use covenant_core::constants::HEARTBEAT_MISSES_BEFORE_TERMINATE;
use covenant_core::{Contract, ContractStatus, CovenantError};
use std::collections::HashMap;
use std::sync::RwLock;

struct Tracked {
    contract: Contract,
    heartbeat_seen_this_tick: bool,
}

/// Tracks every contract once it leaves formation, counting consecutive
/// missed heartbeats and terminating for cause at the configured
/// threshold. A contract counts as heartbeated for a tick once
/// `heartbeat` is called for it; `tick` then resolves the window and
/// resets the flag for the next one.
#[derive(Default)]
pub struct ContractRegistry {
    contracts: RwLock<HashMap<String, Tracked>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, contract: Contract) {
        let id = contract.contract_id.as_hex();
        self.contracts.write().expect("lock poisoned").insert(id, Tracked { contract, heartbeat_seen_this_tick: true });
    }

    pub fn unregister(&self, contract_id: &str) {
        self.contracts.write().expect("lock poisoned").remove(contract_id);
    }

    /// Records that a heartbeat arrived for `contract_id` in the current
    /// window.
    pub fn heartbeat(&self, contract_id: &str) -> Result<(), CovenantError> {
        let mut contracts = self.contracts.write().expect("lock poisoned");
        let tracked =
            contracts.get_mut(contract_id).ok_or_else(|| CovenantError::NotFound(contract_id.to_string()))?;
        tracked.heartbeat_seen_this_tick = true;
        Ok(())
    }

    pub fn contract(&self, contract_id: &str) -> Option<Contract> {
        self.contracts.read().expect("lock poisoned").get(contract_id).map(|t| t.contract.clone())
    }

    /// Resolves the elapsed heartbeat window for every non-terminal
    /// contract: a miss is recorded for anyone who didn't heartbeat since
    /// the previous tick, and `HEARTBEAT_MISSES_BEFORE_TERMINATE`
    /// consecutive misses terminates the contract for cause. Returns the
    /// ids of contracts terminated this tick.
    pub fn tick(&self) -> Vec<String> {
        let mut contracts = self.contracts.write().expect("lock poisoned");
        let mut terminated = Vec::new();
        for (id, tracked) in contracts.iter_mut() {
            if tracked.contract.is_terminal() {
                continue;
            }
            if tracked.heartbeat_seen_this_tick {
                tracked.contract.heartbeat_misses = 0;
            } else {
                tracked.contract.heartbeat_misses += 1;
                if tracked.contract.heartbeat_misses >= HEARTBEAT_MISSES_BEFORE_TERMINATE {
                    tracked.contract.status = ContractStatus::TerminatedForCause;
                    terminated.push(id.clone());
                }
            }
            tracked.heartbeat_seen_this_tick = false;
        }
        terminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::{ContentHash, ContractWindows, Identifier, PricingTerms, ServiceLevelAgreement};

    fn contract() -> Contract {
        Contract {
            contract_id: ContentHash::from_bytes(b"contract-1"),
            advisor: Identifier::new("advisor"),
            operator: Identifier::new("operator"),
            scope: vec!["fee_policy".into()],
            pricing: PricingTerms { base_amount: 1_000, escrow_window_secs: 3_600, performance_bonus_threshold_bp: None, performance_bonus_amount: None },
            sla: ServiceLevelAgreement { terms: serde_json::Value::Null },
            windows: ContractWindows { trial_start: 0, trial_end: 1, main_start: 1, main_end: 2, notice_secs: 0, auto_renew: false },
            management_credential_ref: ContentHash::genesis(),
            initial_escrow_ticket_id: "ticket-1".into(),
            status: ContractStatus::Active,
            advisor_sig: "a".into(),
            operator_sig: "o".into(),
            heartbeat_misses: 0,
        }
    }

    #[test]
    fn missed_heartbeats_accumulate_and_terminate() {
        let registry = ContractRegistry::new();
        let c = contract();
        let id = c.contract_id.as_hex();
        registry.register(c);

        // The registering tick counts as heartbeated; the rest don't.
        assert!(registry.tick().is_empty());
        assert!(registry.tick().is_empty());
        assert!(registry.tick().is_empty());
        let terminated = registry.tick();
        assert_eq!(terminated, vec![id.clone()]);
        assert_eq!(registry.contract(&id).unwrap().status, ContractStatus::TerminatedForCause);
    }

    #[test]
    fn heartbeat_resets_the_miss_counter() {
        let registry = ContractRegistry::new();
        let c = contract();
        let id = c.contract_id.as_hex();
        registry.register(c);

        registry.tick();
        registry.tick();
        registry.heartbeat(&id).unwrap();
        assert!(registry.tick().is_empty());
        assert_eq!(registry.contract(&id).unwrap().heartbeat_misses, 0);
    }
}
