//! Contract formation: `Offer → Proposal → Counter(≤5 rounds) → Accept`,
//! with atomic Management Credential + initial EscrowTicket activation.

use covenant_core::constants::{COUNTER_ROUND_EXPIRY_SECS, MAX_COUNTER_ROUNDS};
use covenant_core::{Contract, ContractStatus, CovenantError, Identifier, Timestamp};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Clone, Debug)]
pub struct CounterProposal {
    pub round: u32,
    pub proposer: Identifier,
    pub terms: serde_json::Value,
    pub proposed_at: Timestamp,
}

struct Negotiation {
    advisor: Identifier,
    operator: Identifier,
    rounds: Vec<CounterProposal>,
}

/// Tracks in-flight negotiations and finalized contracts keyed by a
/// caller-assigned negotiation id.
#[derive(Default)]
pub struct FormationTracker {
    negotiations: RwLock<HashMap<String, Negotiation>>,
}

impl FormationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, negotiation_id: String, advisor: Identifier, operator: Identifier) {
        self.negotiations
            .write()
            .expect("lock poisoned")
            .insert(negotiation_id, Negotiation { advisor, operator, rounds: Vec::new() });
    }

    /// Records a counter-proposal. Rejects the sixth round and any round
    /// proposed after the prior round's 72h expiry.
    pub fn counter(
        &self,
        negotiation_id: &str,
        proposer: Identifier,
        terms: serde_json::Value,
        now: Timestamp,
    ) -> Result<u32, CovenantError> {
        let mut negotiations = self.negotiations.write().expect("lock poisoned");
        let negotiation = negotiations
            .get_mut(negotiation_id)
            .ok_or_else(|| CovenantError::NotFound(negotiation_id.to_string()))?;
        if proposer != negotiation.advisor && proposer != negotiation.operator {
            return Err(CovenantError::OutOfScope);
        }
        if let Some(last) = negotiation.rounds.last() {
            if now - last.proposed_at > COUNTER_ROUND_EXPIRY_SECS {
                return Err(CovenantError::PolicyExpired);
            }
        }
        let round = negotiation.rounds.len() as u32 + 1;
        if round > MAX_COUNTER_ROUNDS {
            return Err(CovenantError::ConstraintViolation("counter-proposal round limit exceeded".into()));
        }
        negotiation.rounds.push(CounterProposal { round, proposer, terms, proposed_at: now });
        Ok(round)
    }

    pub fn rounds(&self, negotiation_id: &str) -> Vec<CounterProposal> {
        self.negotiations
            .read()
            .expect("lock poisoned")
            .get(negotiation_id)
            .map(|n| n.rounds.clone())
            .unwrap_or_default()
    }

    /// Finalizes a negotiation: activates the Management Credential and the
    /// initial EscrowTicket atomically with the contract transition to
    /// `Accepted` — callers must have already persisted both under the same
    /// transaction boundary before calling this, so the two either both
    /// persist or neither does.
    pub fn accept(&self, negotiation_id: &str, contract: &mut Contract) -> Result<(), CovenantError> {
        if !self.negotiations.read().expect("lock poisoned").contains_key(negotiation_id) {
            return Err(CovenantError::NotFound(negotiation_id.to_string()));
        }
        if !contract.both_signed() {
            return Err(CovenantError::ConstraintViolation("both parties must sign before acceptance".into()));
        }
        if contract.management_credential_ref == covenant_core::ContentHash::genesis() {
            return Err(CovenantError::ConstraintViolation("management credential must be issued before acceptance".into()));
        }
        if contract.initial_escrow_ticket_id.is_empty() {
            return Err(CovenantError::ConstraintViolation("initial escrow ticket must exist before acceptance".into()));
        }
        contract.status = ContractStatus::Accepted;
        self.negotiations.write().expect("lock poisoned").remove(negotiation_id);
        Ok(())
    }
}
