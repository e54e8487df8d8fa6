//! Deterministic panel selection for a filed dispute.

use covenant_consensus::{panel_shape, select_panel, EligibleMember, PanelShape};
use covenant_core::ContentHash;
use covenant_crypto::hash::hash_concat;

/// Seeds panel selection from `dispute_id || block_hash_at_filing` so the
/// panel is reproducible by anyone who knows those two public values.
pub fn panel_seed(dispute_id: &str, block_hash_at_filing: ContentHash) -> ContentHash {
    hash_concat(&[dispute_id.as_bytes(), block_hash_at_filing.0.as_slice()])
}

/// Picks the panel shape for the current eligible-member count and, unless
/// it resolves to `Bilateral`, selects the panel deterministically.
pub fn select(
    dispute_id: &str,
    block_hash_at_filing: ContentHash,
    eligible: &[EligibleMember],
) -> (PanelShape, Vec<EligibleMember>) {
    let shape = panel_shape(eligible.len());
    if shape == PanelShape::Bilateral {
        return (shape, Vec::new());
    }
    let seed = panel_seed(dispute_id, block_hash_at_filing);
    (shape, select_panel(seed, eligible, shape.size()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::Identifier;

    fn member(id: &str, bond: u64, tenure: u32) -> EligibleMember {
        EligibleMember { identifier: Identifier::new(id), bond_amount: bond, tenure_days: tenure }
    }

    #[test]
    fn deterministic_for_same_seed_and_pool() {
        let pool: Vec<EligibleMember> = (0..20).map(|i| member(&format!("m{i}"), 100 + i, 200)).collect();
        let hash = ContentHash::genesis();
        let (shape_a, panel_a) = select("d1", hash, &pool);
        let (shape_b, panel_b) = select("d1", hash, &pool);
        assert_eq!(shape_a, shape_b);
        let ids_a: Vec<_> = panel_a.iter().map(|m| m.identifier.clone()).collect();
        let ids_b: Vec<_> = panel_b.iter().map(|m| m.identifier.clone()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn fewer_than_three_eligible_is_bilateral() {
        let pool = vec![member("a", 100, 200), member("b", 200, 300)];
        let (shape, panel) = select("d1", ContentHash::genesis(), &pool);
        assert_eq!(shape, PanelShape::Bilateral);
        assert!(panel.is_empty());
    }
}
