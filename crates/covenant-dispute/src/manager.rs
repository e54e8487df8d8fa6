//! Dispute lifecycle: file, exchange evidence, select a panel, collect
//! votes, resolve.

use crate::outcome::tally;
use crate::selection::select;
use crate::types::{DisputeCase, DisputeOutcome, DisputeStatus, EvidenceRange, Vote};
use covenant_consensus::{EligibleMember, PanelShape};
use covenant_core::constants::{DISPUTE_BILATERAL_COOLING_DAYS, PANEL_VOTE_WINDOW_SECS};
use covenant_core::{ContentHash, CovenantError, Identifier, Timestamp, WindowId};
use std::collections::HashMap;
use std::sync::RwLock;

/// Members who missed the 72h vote window forfeit their temporary bond
/// hold; the caller (bond manager) is told who via [`DisputeManager::sweep_non_voters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonVoter {
    pub dispute_id: String,
    pub member: Identifier,
}

/// Holds all in-flight and resolved disputes for this node.
#[derive(Default)]
pub struct DisputeManager {
    cases: RwLock<HashMap<String, DisputeCase>>,
}

impl DisputeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a dispute and immediately selects a panel (or falls back to
    /// bilateral cooling if fewer than three eligible members exist).
    pub fn file(
        &self,
        dispute_id: String,
        window_id: WindowId,
        claimant: Identifier,
        respondent: Identifier,
        filed_at: Timestamp,
        block_hash_at_filing: ContentHash,
        eligible: &[EligibleMember],
    ) -> Result<DisputeCase, CovenantError> {
        let mut cases = self.cases.write().expect("lock poisoned");
        if cases.contains_key(&dispute_id) {
            return Err(CovenantError::AlreadyExists(dispute_id));
        }
        let (shape, panel) = select(&dispute_id, block_hash_at_filing, eligible);
        let status =
            if shape == PanelShape::Bilateral { DisputeStatus::BilateralCooling } else { DisputeStatus::PanelSelected };
        let case = DisputeCase {
            dispute_id: dispute_id.clone(),
            window_id,
            claimant,
            respondent,
            filed_at,
            block_hash_at_filing,
            evidence: Vec::new(),
            panel,
            votes: Vec::new(),
            status,
            outcome: None,
        };
        cases.insert(dispute_id, case.clone());
        Ok(case)
    }

    pub fn submit_evidence(&self, dispute_id: &str, range: EvidenceRange) -> Result<(), CovenantError> {
        let mut cases = self.cases.write().expect("lock poisoned");
        let case = cases
            .get_mut(dispute_id)
            .ok_or_else(|| CovenantError::NotFound(dispute_id.to_string()))?;
        if !matches!(case.status, DisputeStatus::EvidenceExchange | DisputeStatus::PanelSelected) {
            return Err(CovenantError::ConstraintViolation("evidence window closed".into()));
        }
        case.evidence.push(range);
        Ok(())
    }

    /// Moves evidence exchange into voting. Idempotent no-op once already
    /// voting or resolved.
    pub fn open_voting(&self, dispute_id: &str) -> Result<(), CovenantError> {
        let mut cases = self.cases.write().expect("lock poisoned");
        let case = cases
            .get_mut(dispute_id)
            .ok_or_else(|| CovenantError::NotFound(dispute_id.to_string()))?;
        if case.status == DisputeStatus::PanelSelected {
            case.status = DisputeStatus::Voting;
        }
        Ok(())
    }

    /// Records a panel member's vote. Rejects votes cast after the 72h
    /// window or from non-panel members.
    pub fn cast_vote(&self, dispute_id: &str, vote: Vote, now: Timestamp) -> Result<(), CovenantError> {
        let mut cases = self.cases.write().expect("lock poisoned");
        let case = cases
            .get_mut(dispute_id)
            .ok_or_else(|| CovenantError::NotFound(dispute_id.to_string()))?;
        if case.status != DisputeStatus::Voting {
            return Err(CovenantError::ConstraintViolation("dispute is not in voting status".into()));
        }
        if now - case.filed_at > PANEL_VOTE_WINDOW_SECS {
            return Err(CovenantError::PolicyExpired);
        }
        if !case.panel.iter().any(|m| m.identifier == vote.member) {
            return Err(CovenantError::OutOfScope);
        }
        if case.votes.iter().any(|v| v.member == vote.member) {
            return Err(CovenantError::AlreadyExists(format!("vote from {:?}", vote.member)));
        }
        case.votes.push(vote);
        Ok(())
    }

    /// Tallies votes and marks the dispute resolved. Callable once the vote
    /// window has elapsed or the full panel has voted.
    pub fn resolve(&self, dispute_id: &str, now: Timestamp) -> Result<DisputeOutcome, CovenantError> {
        let mut cases = self.cases.write().expect("lock poisoned");
        let case = cases
            .get_mut(dispute_id)
            .ok_or_else(|| CovenantError::NotFound(dispute_id.to_string()))?;
        if case.status != DisputeStatus::Voting {
            return Err(CovenantError::ConstraintViolation("dispute is not in voting status".into()));
        }
        let window_elapsed = now - case.filed_at > PANEL_VOTE_WINDOW_SECS;
        if case.votes.len() < case.panel.len() && !window_elapsed {
            return Err(CovenantError::QuorumNotReached);
        }
        let outcome = tally(&case.votes).ok_or(CovenantError::QuorumNotReached)?;
        case.outcome = Some(outcome.clone());
        case.status = DisputeStatus::Resolved;
        Ok(outcome)
    }

    /// Panel members who never voted once the window has closed — the bond
    /// manager forfeits their posted temporary bond for each entry returned.
    pub fn sweep_non_voters(&self, now: Timestamp) -> Vec<NonVoter> {
        let cases = self.cases.read().expect("lock poisoned");
        let mut missed = Vec::new();
        for case in cases.values() {
            if case.status != DisputeStatus::Voting {
                continue;
            }
            if now - case.filed_at <= PANEL_VOTE_WINDOW_SECS {
                continue;
            }
            for member in &case.panel {
                if !case.votes.iter().any(|v| v.member == member.identifier) {
                    missed.push(NonVoter { dispute_id: case.dispute_id.clone(), member: member.identifier.clone() });
                }
            }
        }
        missed
    }

    /// The timestamp at which a bilateral-cooling dispute may be
    /// considered abandoned and closed without panel involvement.
    pub fn cooling_deadline(&self, dispute_id: &str) -> Result<Timestamp, CovenantError> {
        let cases = self.cases.read().expect("lock poisoned");
        let case = cases.get(dispute_id).ok_or_else(|| CovenantError::NotFound(dispute_id.to_string()))?;
        if case.status != DisputeStatus::BilateralCooling {
            return Err(CovenantError::ConstraintViolation("dispute is not in bilateral cooling".into()));
        }
        Ok(case.filed_at + DISPUTE_BILATERAL_COOLING_DAYS * 86_400)
    }

    pub fn case(&self, dispute_id: &str) -> Option<DisputeCase> {
        self.cases.read().expect("lock poisoned").get(dispute_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::Signature;

    fn member(id: &str, bond: u64, tenure: u32) -> EligibleMember {
        EligibleMember { identifier: Identifier::new(id), bond_amount: bond, tenure_days: tenure }
    }

    fn pool(n: usize) -> Vec<EligibleMember> {
        (0..n).map(|i| member(&format!("m{i}"), 100 + i as u64, 200)).collect()
    }

    #[test]
    fn fewer_than_three_eligible_goes_bilateral() {
        let mgr = DisputeManager::new();
        let case = mgr
            .file(
                "d1".into(),
                "w1".to_string(),
                Identifier::new("claimant"),
                Identifier::new("respondent"),
                1_000,
                ContentHash::genesis(),
                &pool(2),
            )
            .unwrap();
        assert_eq!(case.status, DisputeStatus::BilateralCooling);
        assert_eq!(mgr.cooling_deadline("d1").unwrap(), 1_000 + 7 * 86_400);
    }

    #[test]
    fn full_panel_votes_and_resolves() {
        let mgr = DisputeManager::new();
        let eligible = pool(20);
        let case = mgr
            .file(
                "d2".into(),
                "w1".to_string(),
                Identifier::new("claimant"),
                Identifier::new("respondent"),
                0,
                ContentHash::genesis(),
                &eligible,
            )
            .unwrap();
        mgr.open_voting("d2").unwrap();
        for (i, m) in case.panel.iter().enumerate() {
            mgr.cast_vote(
                "d2",
                Vote {
                    member: m.identifier.clone(),
                    amount: 100 + i as u64,
                    slash_recommended: i % 2 == 0,
                    cast_at: 10,
                    signature: Signature(vec![]),
                },
                10,
            )
            .unwrap();
        }
        let outcome = mgr.resolve("d2", 10).unwrap();
        assert!(outcome.amount > 0);
        assert!(mgr.sweep_non_voters(10).is_empty());
    }

    #[test]
    fn non_voters_are_swept_after_window_closes() {
        let mgr = DisputeManager::new();
        let eligible = pool(20);
        let case = mgr
            .file(
                "d3".into(),
                "w1".to_string(),
                Identifier::new("claimant"),
                Identifier::new("respondent"),
                0,
                ContentHash::genesis(),
                &eligible,
            )
            .unwrap();
        mgr.open_voting("d3").unwrap();
        let voter = &case.panel[0];
        mgr.cast_vote(
            "d3",
            Vote { member: voter.identifier.clone(), amount: 100, slash_recommended: false, cast_at: 0, signature: Signature(vec![]) },
            0,
        )
        .unwrap();
        let after_window = PANEL_VOTE_WINDOW_SECS + 1;
        let missed = mgr.sweep_non_voters(after_window);
        assert_eq!(missed.len(), case.panel.len() - 1);
    }
}
