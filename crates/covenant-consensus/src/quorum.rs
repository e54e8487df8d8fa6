use std::collections::HashMap;

use covenant_core::Identifier;
use tracing::info;

/// `ceil(2n/3)` supermajority threshold, used both for dispute-panel
/// slashing recommendations and for netting quorum on responder commits.
pub fn supermajority(n: u32) -> u32 {
    (2 * n + 2) / 3
}

/// Tracks distinct-principal acknowledgements toward a quorum threshold,
/// generalizing the originating workspace's per-validator finality
/// confirmation tracker to arbitrary quorum subjects (a netting window, a
/// dispute panel vote round).
#[derive(Debug, Default)]
pub struct QuorumTracker {
    acked: HashMap<String, Vec<Identifier>>,
}

impl QuorumTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an acknowledgement from `member` for `subject`. Returns
    /// `(count, reached)` where `reached` is whether `count >= threshold`.
    /// Duplicate acks from the same member are ignored.
    pub fn ack(&mut self, subject: &str, member: Identifier, threshold: u32) -> (u32, bool) {
        let list = self.acked.entry(subject.to_string()).or_default();
        if !list.contains(&member) {
            list.push(member);
        }
        let count = list.len() as u32;
        let reached = count >= threshold;
        if reached {
            info!(subject, count, threshold, "quorum reached");
        }
        (count, reached)
    }

    pub fn ack_count(&self, subject: &str) -> u32 {
        self.acked.get(subject).map(|v| v.len() as u32).unwrap_or(0)
    }

    pub fn acked_members(&self, subject: &str) -> &[Identifier] {
        self.acked.get(subject).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn clear(&mut self, subject: &str) {
        self.acked.remove(subject);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supermajority_matches_two_thirds_ceiling() {
        assert_eq!(supermajority(9), 6);
        assert_eq!(supermajority(3), 2);
        assert_eq!(supermajority(7), 5);
    }

    #[test]
    fn quorum_tracker_dedupes_and_reaches_threshold() {
        let mut t = QuorumTracker::new();
        let (c1, r1) = t.ack("window-1", Identifier::new("A"), 2);
        assert_eq!((c1, r1), (1, false));
        let (c2, _) = t.ack("window-1", Identifier::new("A"), 2);
        assert_eq!(c2, 1, "duplicate ack must not double count");
        let (c3, r3) = t.ack("window-1", Identifier::new("B"), 2);
        assert_eq!((c3, r3), (2, true));
    }
}
