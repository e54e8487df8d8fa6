//! Slash quantum and the two independent routes to a confirmed slash:
//! report quorum and arbitration supermajority.

use covenant_consensus::{supermajority, QuorumTracker};
use covenant_core::{Amount, Identifier};

/// `max(base_penalty × severity × (1 + 0.5 × repeat_count), 2 × estimated_profit)`.
pub fn slash_quantum(base_penalty: Amount, severity: f64, repeat_count: u32, estimated_profit: Amount) -> Amount {
    let escalated = base_penalty as f64 * severity * (1.0 + 0.5 * repeat_count as f64);
    let profit_floor = 2.0 * estimated_profit as f64;
    escalated.max(profit_floor).round() as Amount
}

/// Tracks independent violation reports toward the `n/2 + 1` quorum that
/// authorizes a slash without going through arbitration.
#[derive(Default)]
pub struct ViolationReportTracker {
    quorum: QuorumTracker,
}

impl ViolationReportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `threshold = n/2 + 1` over `membership_size` independent reporters.
    pub fn report(&mut self, subject: &str, reporter: Identifier, membership_size: u32) -> bool {
        let threshold = membership_size / 2 + 1;
        self.quorum.ack(subject, reporter, threshold).1
    }
}

/// Whether an arbitration panel's slash-recommendation vote count reaches
/// the `2n/3` supermajority that independently authorizes a slash.
pub fn arbitration_authorizes_slash(slash_votes: u32, panel_size: u32) -> bool {
    slash_votes >= supermajority(panel_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantum_is_floored_by_profit() {
        assert_eq!(slash_quantum(100, 1.0, 0, 1_000), 2_000);
        assert_eq!(slash_quantum(10_000, 2.0, 1, 10), 30_000);
    }

    #[test]
    fn violation_quorum_needs_majority_plus_one() {
        let mut tracker = ViolationReportTracker::new();
        assert!(!tracker.report("bond-a", Identifier::new("r1"), 5));
        assert!(!tracker.report("bond-a", Identifier::new("r2"), 5));
        assert!(tracker.report("bond-a", Identifier::new("r3"), 5));
    }

    #[test]
    fn arbitration_route_is_independent_of_report_quorum() {
        assert!(arbitration_authorizes_slash(5, 7));
        assert!(!arbitration_authorizes_slash(4, 7));
    }
}
