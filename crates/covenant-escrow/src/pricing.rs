//! Pricing contract: given `(danger, trust_tier)`, a pure function returns
//! `(base_amount, escrow_window)`. The function is monotonic in danger and
//! inversely monotonic in reputation.

use covenant_core::bond::Tier;
use covenant_core::Amount;

const BASE_AMOUNT_FLOOR: Amount = 10_000;
const DANGER_UNIT_AMOUNT: Amount = 50_000;
const BASE_WINDOW_SECS: i64 = 3_600;
const DANGER_UNIT_WINDOW_SECS: i64 = 1_800;

fn reputation_discount(tier: Tier) -> f64 {
    match tier {
        Tier::Newcomer => 1.0,
        Tier::Recognized => 0.85,
        Tier::Trusted => 0.7,
        Tier::Senior => 0.55,
        Tier::Founding => 0.4,
    }
}

/// `(base_amount, escrow_window_secs)`: strictly non-decreasing in `danger`,
/// strictly non-increasing in trust tier (higher tier ⇒ smaller or equal
/// escrow requirement).
pub fn price(danger: u8, tier: Tier) -> (Amount, i64) {
    let danger = danger as u64;
    let base_amount =
        BASE_AMOUNT_FLOOR + ((danger * DANGER_UNIT_AMOUNT) as f64 * reputation_discount(tier)) as Amount;
    let escrow_window = BASE_WINDOW_SECS + danger as i64 * DANGER_UNIT_WINDOW_SECS;
    (base_amount, escrow_window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_in_danger() {
        let (a_low, w_low) = price(1, Tier::Newcomer);
        let (a_high, w_high) = price(9, Tier::Newcomer);
        assert!(a_high > a_low);
        assert!(w_high > w_low);
    }

    #[test]
    fn inversely_monotonic_in_reputation() {
        let (a_new, _) = price(7, Tier::Newcomer);
        let (a_founding, _) = price(7, Tier::Founding);
        assert!(a_founding < a_new);
    }
}
