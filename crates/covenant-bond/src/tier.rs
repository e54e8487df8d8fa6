//! Pure tier derivation and effective-bond weighting.

use covenant_core::constants::{BOND_FULL_WEIGHT_TENURE_DAYS, NEW_MEMBER_MIN_BOND_MEDIAN_FRACTION};
use covenant_core::Tier;

/// `tier(reputation, bond_amount, tenure_days, dispute_losses)`. Thresholds
/// are evaluated from the top down: a member must clear every gate for a
/// tier to qualify for it.
pub fn tier(reputation: f64, bond_amount: u64, tenure_days: u32, dispute_losses: u32) -> Tier {
    if reputation >= 0.90 && bond_amount >= 100_000 && tenure_days >= 720 && dispute_losses == 0 {
        Tier::Founding
    } else if reputation >= 0.75 && bond_amount >= 50_000 && tenure_days >= 365 && dispute_losses <= 1 {
        Tier::Senior
    } else if reputation >= 0.50 && bond_amount >= 10_000 && tenure_days >= 90 && dispute_losses <= 2 {
        Tier::Trusted
    } else if reputation >= 0.25 && bond_amount >= 1_000 && tenure_days >= 14 {
        Tier::Recognized
    } else {
        Tier::Newcomer
    }
}

/// `min(1.0, tenure/180) × amount`.
pub fn effective_weight(bond_amount: u64, tenure_days: u32) -> f64 {
    (tenure_days as f64 / BOND_FULL_WEIGHT_TENURE_DAYS).min(1.0) * bond_amount as f64
}

/// `max(base_min, 0.5 × median_bond_of_existing_members)`.
pub fn new_member_minimum(base_min: u64, existing_bonds: &[u64]) -> u64 {
    if existing_bonds.is_empty() {
        return base_min;
    }
    let mut sorted = existing_bonds.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    };
    let from_median = (NEW_MEMBER_MIN_BOND_MEDIAN_FRACTION * median) as u64;
    base_min.max(from_median)
}
