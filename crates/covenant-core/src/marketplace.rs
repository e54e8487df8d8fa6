use crate::types::{ContentHash, Identifier, Timestamp};
use serde::{Deserialize, Serialize};

/// Event kinds, each assigned a distinct numeric identifier drawn from two
/// parallel ranges — advisor services and liquidity services
///. Kind numbers follow NIP-01-style replaceable-event
/// ranges: advisor services occupy `38380..=38385`, liquidity services
/// occupy `38390..=38395`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ProviderProfile,
    Offer,
    Rfp,
    ContractConfirmation,
    Heartbeat,
    ReputationSummary,
}

/// Which parallel numeric range a service belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceClass {
    Advisor,
    Liquidity,
}

impl EventKind {
    const ADVISOR_BASE: u32 = 38_380;
    const LIQUIDITY_BASE: u32 = 38_390;

    fn offset(&self) -> u32 {
        match self {
            EventKind::ProviderProfile => 0,
            EventKind::Offer => 1,
            EventKind::Rfp => 2,
            EventKind::ContractConfirmation => 3,
            EventKind::Heartbeat => 4,
            EventKind::ReputationSummary => 5,
        }
    }

    /// The numeric kind identifier for this event in the given service
    /// class's range.
    pub fn numeric(&self, class: ServiceClass) -> u32 {
        let base = match class {
            ServiceClass::Advisor => Self::ADVISOR_BASE,
            ServiceClass::Liquidity => Self::LIQUIDITY_BASE,
        };
        base + self.offset()
    }

    /// Kind `38383` — the dual-meaning transition case: legacy meaning is
    /// `ProviderProfile`, reassigned meaning is `ContractConfirmation`.
    /// Returns both candidate interpretations for a numeric kind of
    /// `38383` seen during the transition window.
    pub fn legacy_and_reassigned(numeric: u32) -> Option<(EventKind, EventKind)> {
        if numeric == Self::ADVISOR_BASE + 3 {
            Some((EventKind::ProviderProfile, EventKind::ContractConfirmation))
        } else {
            None
        }
    }
}

/// Standard marketplace event tags.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventTags {
    /// `d` — replace-key.
    pub d_tag: String,
    /// `t` — topic.
    #[serde(default)]
    pub topic: Option<String>,
    /// `expiration` — unix timestamp.
    pub expiration: Timestamp,
    /// `did` — issuer identifier.
    pub did: Identifier,
    /// `did-nostr-proof` — binding credential reference.
    #[serde(default)]
    pub did_proof: Option<ContentHash>,
    /// `nonce` — proof-of-work nonce.
    #[serde(default)]
    pub pow_nonce: Option<String>,
    /// `alt` — human summary.
    #[serde(default)]
    pub alt: Option<String>,
}

/// A marketplace event — `Profile | Offer | RFP | ContractConfirmation |
/// Heartbeat | ReputationSummary` — parameterized replaceable by
/// `(issuer, d-tag)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketplaceEvent {
    pub issuer: Identifier,
    pub kind: EventKind,
    pub class: ServiceClass,
    pub created_at: Timestamp,
    pub tags: EventTags,
    pub content: serde_json::Value,
    pub content_hash: ContentHash,
    pub sig: String,
}

impl MarketplaceEvent {
    pub fn replace_key(&self) -> (Identifier, u32, String) {
        (self.issuer.clone(), self.kind.numeric(self.class), self.tags.d_tag.clone())
    }

    /// Replacement rule: strictly larger `created_at` supersedes; ties
    /// broken by canonical-hash ordering.
    pub fn supersedes(&self, other: &MarketplaceEvent) -> bool {
        if self.created_at != other.created_at {
            self.created_at > other.created_at
        } else {
            self.content_hash.0 > other.content_hash.0
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.tags.expiration
    }
}
