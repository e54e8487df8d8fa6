//! Bilateral and multilateral netting.

use covenant_core::{Amount, Identifier, Obligation};
use std::collections::BTreeMap;

/// A single resulting settlement instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetPayment {
    pub from: Identifier,
    pub to: Identifier,
    pub amount: Amount,
}

/// `net(A→B) = Σ(A→B) − Σ(B→A)`.
/// Returns `None` when the net amount is zero (no escrow implied).
pub fn bilateral_net(obligations: &[Obligation], a: &Identifier, b: &Identifier) -> Option<NetPayment> {
    let a_to_b: i128 = obligations
        .iter()
        .filter(|o| &o.from == a && &o.to == b)
        .map(|o| o.amount as i128)
        .sum();
    let b_to_a: i128 = obligations
        .iter()
        .filter(|o| &o.from == b && &o.to == a)
        .map(|o| o.amount as i128)
        .sum();
    let net = a_to_b - b_to_a;
    if net == 0 {
        None
    } else if net > 0 {
        Some(NetPayment { from: a.clone(), to: b.clone(), amount: net as Amount })
    } else {
        Some(NetPayment { from: b.clone(), to: a.clone(), amount: (-net) as Amount })
    }
}

/// Multilateral netting over a set of `N` counterparties: computes each
/// participant's net position,
/// then produces at most `max(|positive|, |negative|) − 1` payments
/// routing from negatives (debtors) to positives (creditors) in
/// decreasing-magnitude order with exact balance matching. Deterministic
/// given identical obligation sets: participants are ordered by
/// `Identifier` bytes, not by iteration order.
pub fn multilateral_net(obligations: &[Obligation]) -> Vec<NetPayment> {
    let mut positions: BTreeMap<Identifier, i128> = BTreeMap::new();
    for o in obligations {
        *positions.entry(o.to.clone()).or_insert(0) += o.amount as i128;
        *positions.entry(o.from.clone()).or_insert(0) -= o.amount as i128;
    }

    let mut creditors: Vec<(Identifier, i128)> =
        positions.iter().filter(|(_, &p)| p > 0).map(|(id, &p)| (id.clone(), p)).collect();
    let mut debtors: Vec<(Identifier, i128)> =
        positions.iter().filter(|(_, &p)| p < 0).map(|(id, &p)| (id.clone(), -p)).collect();

    // Decreasing magnitude, ties broken by identifier bytes (BTreeMap
    // iteration is already identifier-ordered, so a stable sort on
    // magnitude preserves that tiebreak).
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    debtors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut payments = Vec::new();
    let mut ci = 0usize;
    let mut di = 0usize;
    while ci < creditors.len() && di < debtors.len() {
        let (creditor, credit) = &mut creditors[ci];
        let (debtor, debt) = &mut debtors[di];
        let amount = (*credit).min(*debt);
        if amount > 0 {
            payments.push(NetPayment { from: debtor.clone(), to: creditor.clone(), amount: amount as Amount });
        }
        *credit -= amount;
        *debt -= amount;
        if *credit == 0 {
            ci += 1;
        }
        if *debt == 0 {
            di += 1;
        }
    }
    payments
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::ObligationKind;

    fn ob(from: &str, to: &str, amount: u64) -> Obligation {
        Obligation {
            window_id: "w1".into(),
            from: Identifier::new(from),
            to: Identifier::new(to),
            kind: ObligationKind::PerAction,
            reference: "r".into(),
            amount,
            receipt_id: 1,
            status: covenant_core::ObligationStatus::Pending,
        }
    }

    #[test]
    fn bilateral_nets_to_single_direction() {
        let obligations = vec![ob("a", "b", 100), ob("b", "a", 40)];
        let net = bilateral_net(&obligations, &Identifier::new("a"), &Identifier::new("b")).unwrap();
        assert_eq!(net.from, Identifier::new("a"));
        assert_eq!(net.amount, 60);
    }

    #[test]
    fn bilateral_zero_net_yields_no_payment() {
        let obligations = vec![ob("a", "b", 50), ob("b", "a", 50)];
        assert!(bilateral_net(&obligations, &Identifier::new("a"), &Identifier::new("b")).is_none());
    }

    #[test]
    fn multilateral_bounded_by_n_minus_one() {
        // a owes 100 to c, b owes 100 to c: positions a=-100, b=-100, c=+200.
        let obligations = vec![ob("a", "c", 100), ob("b", "c", 100)];
        let payments = multilateral_net(&obligations);
        assert_eq!(payments.len(), 2);
        let total: u64 = payments.iter().map(|p| p.amount).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn multilateral_is_deterministic_regardless_of_input_order() {
        let forward = vec![ob("a", "c", 100), ob("b", "c", 60), ob("d", "a", 30)];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(multilateral_net(&forward), multilateral_net(&reversed));
    }
}
