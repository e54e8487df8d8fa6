//! Netting agreement protocol:
//! propose → ack/disagree → commit-on-quorum, with non-responders falling
//! back to bilateral settlement.

use covenant_consensus::QuorumTracker;
use covenant_core::{ContentHash, CovenantError, Identifier};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Disagreement {
    pub member: Identifier,
    pub their_hash: ContentHash,
}

#[derive(Default)]
struct ProposalRecord {
    obligation_set_hash: ContentHash,
    participants: Vec<Identifier>,
    disagreements: Vec<Disagreement>,
}

/// Tracks in-flight netting proposals and their acknowledgement quorum.
/// `propose`/`ack`/`disagree` drive the proposal through quorum
/// collection; `resolve` commits on full quorum or falls back to
/// bilateral settlement per non-responder on partial quorum.
#[derive(Default)]
pub struct AgreementTracker {
    quorum: QuorumTracker,
    proposals: HashMap<String, ProposalRecord>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AgreementOutcome {
    Pending,
    Committed,
    PartialQuorum { non_responders: Vec<Identifier> },
}

impl AgreementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn propose(&mut self, window_id: &str, obligation_set_hash: ContentHash, participants: Vec<Identifier>) {
        self.proposals.insert(
            window_id.to_string(),
            ProposalRecord { obligation_set_hash, participants, disagreements: Vec::new() },
        );
        self.quorum.clear(window_id);
    }

    pub fn ack(&mut self, window_id: &str, member: Identifier) -> Result<AgreementOutcome, CovenantError> {
        let record = self
            .proposals
            .get(window_id)
            .ok_or_else(|| CovenantError::NotFound(format!("no proposal for window {window_id}")))?;
        let threshold = record.participants.len() as u32;
        let (_, reached) = self.quorum.ack(window_id, member, threshold.max(1));
        Ok(if reached { AgreementOutcome::Committed } else { AgreementOutcome::Pending })
    }

    pub fn disagree(&mut self, window_id: &str, member: Identifier, their_hash: ContentHash) -> Result<(), CovenantError> {
        let record = self
            .proposals
            .get_mut(window_id)
            .ok_or_else(|| CovenantError::NotFound(format!("no proposal for window {window_id}")))?;
        record.disagreements.push(Disagreement { member, their_hash });
        Ok(())
    }

    /// Resolves a proposal once the bounded wait has elapsed: full
    /// responder-quorum commits; otherwise non-responders are excluded and
    /// fall back to bilateral settlement.
    pub fn resolve_after_wait(&self, window_id: &str) -> Result<AgreementOutcome, CovenantError> {
        let record = self
            .proposals
            .get(window_id)
            .ok_or_else(|| CovenantError::NotFound(format!("no proposal for window {window_id}")))?;
        let acked = self.quorum.acked_members(window_id);
        if acked.len() == record.participants.len() && record.disagreements.is_empty() {
            return Ok(AgreementOutcome::Committed);
        }
        let non_responders: Vec<Identifier> =
            record.participants.iter().filter(|p| !acked.contains(p)).cloned().collect();
        Ok(AgreementOutcome::PartialQuorum { non_responders })
    }

    pub fn disagreements(&self, window_id: &str) -> Vec<Disagreement> {
        self.proposals.get(window_id).map(|r| r.disagreements.clone()).unwrap_or_default()
    }

    pub fn obligation_set_hash(&self, window_id: &str) -> Option<ContentHash> {
        self.proposals.get(window_id).map(|r| r.obligation_set_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_quorum_commits() {
        let mut tracker = AgreementTracker::new();
        let hash = ContentHash::genesis();
        tracker.propose("w1", hash, vec![Identifier::new("a"), Identifier::new("b")]);
        assert_eq!(tracker.ack("w1", Identifier::new("a")).unwrap(), AgreementOutcome::Pending);
        assert_eq!(tracker.ack("w1", Identifier::new("b")).unwrap(), AgreementOutcome::Committed);
    }

    #[test]
    fn partial_quorum_names_non_responders() {
        let mut tracker = AgreementTracker::new();
        let hash = ContentHash::genesis();
        tracker.propose("w1", hash, vec![Identifier::new("a"), Identifier::new("b"), Identifier::new("c")]);
        tracker.ack("w1", Identifier::new("a")).unwrap();
        let outcome = tracker.resolve_after_wait("w1").unwrap();
        match outcome {
            AgreementOutcome::PartialQuorum { non_responders } => {
                assert_eq!(non_responders.len(), 2);
            }
            other => panic!("expected partial quorum, got {other:?}"),
        }
    }
}
