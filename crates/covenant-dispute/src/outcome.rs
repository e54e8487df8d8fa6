//! Vote tallying: an outcome amount is the median (simple majority) of
//! votes; slashing recommendation requires supermajority.

use crate::types::{DisputeOutcome, Vote};
use covenant_consensus::supermajority;
use covenant_core::Amount;

/// The median vote amount (even-length vote sets average the two middle
/// values, rounding down) and whether slashing reaches supermajority.
pub fn tally(votes: &[Vote]) -> Option<DisputeOutcome> {
    if votes.is_empty() {
        return None;
    }
    let mut amounts: Vec<Amount> = votes.iter().map(|v| v.amount).collect();
    amounts.sort_unstable();
    let mid = amounts.len() / 2;
    let amount = if amounts.len() % 2 == 1 {
        amounts[mid]
    } else {
        (amounts[mid - 1] + amounts[mid]) / 2
    };

    let slash_votes = votes.iter().filter(|v| v.slash_recommended).count() as u32;
    let slash_recommended = slash_votes >= supermajority(votes.len() as u32);

    Some(DisputeOutcome { amount, slash_recommended })
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::Identifier;

    fn vote(member: &str, amount: u64, slash: bool) -> Vote {
        Vote {
            member: Identifier::new(member),
            amount,
            slash_recommended: slash,
            cast_at: 0,
            signature: covenant_core::Signature(vec![]),
        }
    }

    #[test]
    fn median_of_odd_votes() {
        let votes = vec![vote("a", 100, false), vote("b", 300, false), vote("c", 200, false)];
        let outcome = tally(&votes).unwrap();
        assert_eq!(outcome.amount, 200);
    }

    #[test]
    fn slash_needs_supermajority_not_simple_majority() {
        let votes = vec![
            vote("a", 100, true),
            vote("b", 100, true),
            vote("c", 100, false),
            vote("d", 100, false),
            vote("e", 100, false),
        ];
        // supermajority(5) = 4; only 2 recommend slash.
        assert!(!tally(&votes).unwrap().slash_recommended);
    }
}
