//! Bond lifecycle: post, slash, refund, tier tracking.

use crate::slash::slash_quantum;
use crate::tier::{new_member_minimum, tier};
use covenant_core::{Amount, Bond, BondPredicate, BondStatus, CovenantError, Identifier, SlashRecord, Tier, Timestamp};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct BondManager {
    bonds: RwLock<HashMap<Identifier, Bond>>,
    base_min: Amount,
}

impl BondManager {
    pub fn new(base_min: Amount) -> Self {
        Self { bonds: RwLock::new(HashMap::new()), base_min }
    }

    /// Posts a new bond, rejecting amounts below the new-member minimum
    /// (`max(base_min, 0.5 × median_bond_of_existing_members)`).
    pub fn post(
        &self,
        owner: Identifier,
        amount: Amount,
        predicate: BondPredicate,
        posted_at: Timestamp,
    ) -> Result<(), CovenantError> {
        let mut bonds = self.bonds.write().expect("lock poisoned");
        if bonds.contains_key(&owner) {
            return Err(CovenantError::AlreadyExists(format!("bond for {owner:?}")));
        }
        let existing: Vec<u64> = bonds.values().map(|b| b.amount).collect();
        let minimum = new_member_minimum(self.base_min, &existing);
        if amount < minimum {
            return Err(CovenantError::InsufficientFunds { need: minimum, have: amount });
        }
        let bond = Bond {
            owner: owner.clone(),
            amount,
            predicate,
            slash_log: Vec::new(),
            status: BondStatus::Active,
            posted_at,
            tenure_days: 0,
            reputation: 0.5,
            dispute_losses: 0,
            tier: Some(Tier::Newcomer),
        };
        bonds.insert(owner, bond);
        Ok(())
    }

    /// Applies a slash, demoting the owner's tier immediately and marking
    /// the bond forfeited if the slash exhausts it.
    pub fn slash(
        &self,
        owner: &Identifier,
        base_penalty: Amount,
        severity: f64,
        repeat_count: u32,
        estimated_profit: Amount,
        reason: String,
        slashed_at: Timestamp,
        via_arbitration: bool,
    ) -> Result<Amount, CovenantError> {
        let mut bonds = self.bonds.write().expect("lock poisoned");
        let bond = bonds.get_mut(owner).ok_or_else(|| CovenantError::NotFound(format!("{owner:?}")))?;
        if bond.status == BondStatus::Forfeited || bond.status == BondStatus::Refunded {
            return Err(CovenantError::ConstraintViolation("bond is not slashable in its current status".into()));
        }
        let quantum = slash_quantum(base_penalty, severity, repeat_count, estimated_profit).min(bond.remaining());
        bond.slash_log.push(SlashRecord { amount: quantum, reason, slashed_at, via_arbitration });
        bond.dispute_losses += 1;
        bond.status =
            if bond.remaining() == 0 { BondStatus::Forfeited } else { BondStatus::SlashedPartial };
        bond.tier = Some(tier(bond.reputation, bond.remaining(), bond.tenure_days, bond.dispute_losses));
        Ok(quantum)
    }

    /// Refunds a bond after its locktime, provided it has not been
    /// forfeited.
    pub fn refund(&self, owner: &Identifier, now: Timestamp) -> Result<Amount, CovenantError> {
        let mut bonds = self.bonds.write().expect("lock poisoned");
        let bond = bonds.get_mut(owner).ok_or_else(|| CovenantError::NotFound(format!("{owner:?}")))?;
        if bond.status == BondStatus::Forfeited {
            return Err(CovenantError::ConstraintViolation("bond was forfeited".into()));
        }
        if now < bond.predicate.refund_locktime {
            return Err(CovenantError::ConstraintViolation("refund locktime has not elapsed".into()));
        }
        let remaining = bond.remaining();
        bond.status = BondStatus::Refunded;
        Ok(remaining)
    }

    /// Recomputes tenure-derived fields (tenure, reputation) and tier for
    /// every active bond; called periodically by the orchestrator.
    pub fn refresh_tenure(&self, owner: &Identifier, now: Timestamp) -> Result<Tier, CovenantError> {
        let mut bonds = self.bonds.write().expect("lock poisoned");
        let bond = bonds.get_mut(owner).ok_or_else(|| CovenantError::NotFound(format!("{owner:?}")))?;
        bond.tenure_days = ((now - bond.posted_at).max(0) / 86_400) as u32;
        let new_tier = tier(bond.reputation, bond.remaining(), bond.tenure_days, bond.dispute_losses);
        bond.tier = Some(new_tier);
        Ok(new_tier)
    }

    pub fn bond(&self, owner: &Identifier) -> Option<Bond> {
        self.bonds.read().expect("lock poisoned").get(owner).cloned()
    }

    /// Refunds every active bond whose timelock has elapsed as of `now`,
    /// returning the owners refunded. Called periodically by the
    /// orchestrator's bond-monitor job.
    pub fn scan_refundable(&self, now: Timestamp) -> Vec<Identifier> {
        let mut bonds = self.bonds.write().expect("lock poisoned");
        let mut refunded = Vec::new();
        for (owner, bond) in bonds.iter_mut() {
            if bond.status == BondStatus::Active && now >= bond.predicate.refund_locktime {
                bond.status = BondStatus::Refunded;
                refunded.push(owner.clone());
            }
        }
        refunded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::PublicKey;

    fn predicate(refund_locktime: Timestamp) -> BondPredicate {
        BondPredicate { witness_keys: vec![], threshold: 1, refund_locktime, owner_key: PublicKey(vec![1]) }
    }

    #[test]
    fn new_member_must_meet_median_floor() {
        let mgr = BondManager::new(100);
        mgr.post(Identifier::new("a"), 10_000, predicate(0), 0).unwrap();
        let err = mgr.post(Identifier::new("b"), 1_000, predicate(0), 0).unwrap_err();
        assert!(matches!(err, CovenantError::InsufficientFunds { .. }));
    }

    #[test]
    fn slash_exhausting_bond_forfeits_it() {
        let mgr = BondManager::new(100);
        mgr.post(Identifier::new("a"), 1_000, predicate(0), 0).unwrap();
        let slashed = mgr.slash(&Identifier::new("a"), 10_000, 1.0, 0, 0, "violation".into(), 10, false).unwrap();
        assert_eq!(slashed, 1_000);
        let bond = mgr.bond(&Identifier::new("a")).unwrap();
        assert_eq!(bond.status, BondStatus::Forfeited);
    }

    #[test]
    fn refund_requires_locktime_elapsed() {
        let mgr = BondManager::new(100);
        mgr.post(Identifier::new("a"), 1_000, predicate(1_000), 0).unwrap();
        assert!(mgr.refund(&Identifier::new("a"), 500).is_err());
        assert_eq!(mgr.refund(&Identifier::new("a"), 1_000).unwrap(), 1_000);
    }

    #[test]
    fn scan_refundable_refunds_only_elapsed_active_bonds() {
        let mgr = BondManager::new(100);
        mgr.post(Identifier::new("a"), 1_000, predicate(1_000), 0).unwrap();
        mgr.post(Identifier::new("b"), 1_000, predicate(5_000), 0).unwrap();

        let refunded = mgr.scan_refundable(1_000);
        assert_eq!(refunded, vec![Identifier::new("a")]);
        assert_eq!(mgr.bond(&Identifier::new("a")).unwrap().status, BondStatus::Refunded);
        assert_eq!(mgr.bond(&Identifier::new("b")).unwrap().status, BondStatus::Active);

        assert!(mgr.scan_refundable(1_000).is_empty());
    }
}
