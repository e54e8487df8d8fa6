//! Deterministic weighted panel selection.

use covenant_core::{ContentHash, Identifier};
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha_shim::ChaChaLikeRng;
use serde::{Deserialize, Serialize};

/// A candidate eligible for panel membership, already filtered by
/// "not a party, tenure ≥ threshold, reputation ≥ threshold, bond ≥
/// threshold".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EligibleMember {
    pub identifier: Identifier,
    pub bond_amount: u64,
    pub tenure_days: u32,
}

impl EligibleMember {
    /// `weight = bond × sqrt(tenure_days)`.
    pub fn weight(&self) -> f64 {
        (self.bond_amount as f64) * (self.tenure_days as f64).sqrt()
    }
}

/// Panel size and required-majority shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelShape {
    /// 5-of-7.
    SevenMember,
    /// 3-of-5.
    FiveMember,
    /// 2-of-3.
    ThreeMember,
    /// Fewer than 3 eligible members: bilateral with a cooling period.
    Bilateral,
}

impl PanelShape {
    pub fn size(&self) -> usize {
        match self {
            PanelShape::SevenMember => covenant_core::constants::PANEL_SIZE_LARGE,
            PanelShape::FiveMember => covenant_core::constants::PANEL_SIZE_MEDIUM,
            PanelShape::ThreeMember => covenant_core::constants::PANEL_SIZE_SMALL,
            PanelShape::Bilateral => 0,
        }
    }

    pub fn majority(&self) -> usize {
        match self {
            PanelShape::SevenMember => 5,
            PanelShape::FiveMember => 3,
            PanelShape::ThreeMember => 2,
            PanelShape::Bilateral => 0,
        }
    }
}

/// Chooses the panel shape from the count of eligible members: 7 or more
/// gets a 5-of-7 panel, 5 or more gets 3-of-5, 3 or more gets 2-of-3,
/// else bilateral with a 7-day cooling period.
pub fn panel_shape(eligible_count: usize) -> PanelShape {
    use covenant_core::constants::{PANEL_ELIGIBLE_THRESHOLD_LARGE, PANEL_ELIGIBLE_THRESHOLD_MEDIUM};
    if eligible_count >= PANEL_ELIGIBLE_THRESHOLD_LARGE {
        PanelShape::SevenMember
    } else if eligible_count >= PANEL_ELIGIBLE_THRESHOLD_MEDIUM {
        PanelShape::FiveMember
    } else if eligible_count >= 3 {
        PanelShape::ThreeMember
    } else {
        PanelShape::Bilateral
    }
}

/// Deterministic weighted sample of `k` members without replacement, seeded
/// by `seed`.
/// Identical `(seed, eligible)` always yields the same panel.
pub fn select_panel(seed: ContentHash, eligible: &[EligibleMember], k: usize) -> Vec<EligibleMember> {
    if k == 0 || eligible.is_empty() {
        return Vec::new();
    }
    // Sort candidates by identifier first so the sample is independent of
    // the caller's iteration order — only `seed` and the eligible set's
    // *contents* may influence the outcome.
    let mut pool: Vec<EligibleMember> = eligible.to_vec();
    pool.sort_by(|a, b| a.identifier.0.cmp(&b.identifier.0));

    let mut rng = ChaChaLikeRng::from_seed(seed.0);
    let mut chosen = Vec::with_capacity(k.min(pool.len()));
    let mut remaining = pool;
    for _ in 0..k.min(remaining.len()) {
        let weights: Vec<f64> = remaining.iter().map(|m| m.weight().max(f64::MIN_POSITIVE)).collect();
        let dist = WeightedIndex::new(&weights).expect("positive weights");
        let idx = dist.sample(&mut rng);
        chosen.push(remaining.remove(idx));
    }
    chosen
}

/// Thin wrapper so this crate does not need the `rand_chacha` crate as a
/// separate dependency: `rand`'s `StdRng` is itself ChaCha-backed and
/// seedable from a 32-byte array, which is exactly what a `ContentHash`
/// already is.
mod rand_chacha_shim {
    pub type ChaChaLikeRng = rand::rngs::StdRng;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(n: usize) -> Vec<EligibleMember> {
        (0..n)
            .map(|i| EligibleMember {
                identifier: Identifier::new(format!("member-{i}")),
                bond_amount: 1000 + i as u64 * 10,
                tenure_days: 200,
            })
            .collect()
    }

    #[test]
    fn same_seed_and_set_yields_same_panel() {
        let seed = ContentHash::from_bytes(b"dispute-1|blockhash");
        let pool = members(20);
        let p1 = select_panel(seed, &pool, 7);
        let p2 = select_panel(seed, &pool, 7);
        let ids1: Vec<_> = p1.iter().map(|m| m.identifier.clone()).collect();
        let ids2: Vec<_> = p2.iter().map(|m| m.identifier.clone()).collect();
        assert_eq!(ids1, ids2);
        assert_eq!(ids1.len(), 7);
    }

    #[test]
    fn panel_shape_matches_thresholds() {
        assert_eq!(panel_shape(20).size(), 7);
        assert_eq!(panel_shape(10).size(), 5);
        assert_eq!(panel_shape(4).size(), 3);
        assert_eq!(panel_shape(1).size(), 0);
    }

    #[test]
    fn different_seed_can_change_panel() {
        let pool = members(20);
        let seed_a = ContentHash::from_bytes(b"dispute-1|blockhash-a");
        let seed_b = ContentHash::from_bytes(b"dispute-1|blockhash-b");
        let pa = select_panel(seed_a, &pool, 7);
        let pb = select_panel(seed_b, &pool, 7);
        let ids_a: Vec<_> = pa.iter().map(|m| &m.identifier).collect();
        let ids_b: Vec<_> = pb.iter().map(|m| &m.identifier).collect();
        assert_ne!(ids_a, ids_b, "different seeds should (almost always) pick a different panel");
    }
}
