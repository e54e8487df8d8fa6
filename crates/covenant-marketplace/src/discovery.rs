//! Weighted discovery ranking.

use covenant_core::constants::DEFAULT_RANKING_WEIGHTS;
use covenant_core::MarketplaceEvent;

/// Per-candidate match signals, each expected in `[0,1]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchSignals {
    pub reputation: f64,
    pub capability_match: f64,
    pub spec_match: f64,
    pub price_fit: f64,
    pub availability: f64,
    pub freshness: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct RankingWeights {
    pub reputation: f64,
    pub capability_match: f64,
    pub spec_match: f64,
    pub price_fit: f64,
    pub availability: f64,
    pub freshness: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        let (reputation, capability_match, spec_match, price_fit, availability, freshness) = DEFAULT_RANKING_WEIGHTS;
        Self { reputation, capability_match, spec_match, price_fit, availability, freshness }
    }
}

impl RankingWeights {
    pub fn score(&self, signals: &MatchSignals) -> f64 {
        self.reputation * signals.reputation
            + self.capability_match * signals.capability_match
            + self.spec_match * signals.spec_match
            + self.price_fit * signals.price_fit
            + self.availability * signals.availability
            + self.freshness * signals.freshness
    }
}

/// Ranks `candidates` by weighted score, breaking ties by reputation then
/// freshness.
pub fn rank(
    weights: &RankingWeights,
    candidates: Vec<(MarketplaceEvent, MatchSignals)>,
) -> Vec<(MarketplaceEvent, f64)> {
    let mut scored: Vec<(MarketplaceEvent, MatchSignals, f64)> =
        candidates.into_iter().map(|(event, signals)| {
            let score = weights.score(&signals);
            (event, signals, score)
        }).collect();
    scored.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap()
            .then_with(|| b.1.reputation.partial_cmp(&a.1.reputation).unwrap())
            .then_with(|| b.1.freshness.partial_cmp(&a.1.freshness).unwrap())
    });
    scored.into_iter().map(|(event, _, score)| (event, score)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::{ContentHash, EventKind, EventTags, Identifier, ServiceClass};

    fn event(d_tag: &str) -> MarketplaceEvent {
        MarketplaceEvent {
            issuer: Identifier::new("a"),
            kind: EventKind::Offer,
            class: ServiceClass::Advisor,
            created_at: 0,
            tags: EventTags { d_tag: d_tag.to_string(), expiration: 1_000, did: Identifier::new("a"), ..Default::default() },
            content: serde_json::Value::Null,
            content_hash: ContentHash::genesis(),
            sig: String::new(),
        }
    }

    #[test]
    fn higher_score_ranks_first() {
        let weights = RankingWeights::default();
        let high = MatchSignals { reputation: 1.0, capability_match: 1.0, spec_match: 1.0, price_fit: 1.0, availability: 1.0, freshness: 1.0 };
        let low = MatchSignals::default();
        let ranked = rank(&weights, vec![(event("low"), low), (event("high"), high)]);
        assert_eq!(ranked[0].0.tags.d_tag, "high");
    }

    #[test]
    fn ties_fall_back_to_reputation_then_freshness() {
        let weights = RankingWeights::default();
        let a = MatchSignals { reputation: 0.9, freshness: 0.1, ..Default::default() };
        let b = MatchSignals { reputation: 0.1, freshness: 0.9, ..Default::default() };
        // Equal weighted score requires matching combos; here we just check reputation wins when scores tie exactly.
        let equal_weights = RankingWeights { reputation: 1.0, capability_match: 0.0, spec_match: 0.0, price_fit: 0.0, availability: 0.0, freshness: 0.0 };
        let ranked = rank(&equal_weights, vec![(event("b"), b), (event("a"), a)]);
        assert_eq!(ranked[0].0.tags.d_tag, "a");
    }
}
