//! Replaceable-event cache: replacement rule, expiration and GC.

use covenant_core::{EventKind, Identifier, MarketplaceEvent, ServiceClass, Timestamp};
use std::collections::HashMap;
use std::sync::RwLock;

type ReplaceKey = (Identifier, u32, String);

/// How long an expired event is retained before `garbage_collect` drops it,
/// so late queries against a just-expired event still see a tombstone-free
/// miss instead of a dangling reference.
const GC_GRACE_SECS: Timestamp = 3_600;

#[derive(Default)]
pub struct EventCache {
    events: RwLock<HashMap<ReplaceKey, MarketplaceEvent>>,
}

impl EventCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests an event, applying the replacement rule: the event with the
    /// strictly larger `created_at` supersedes, ties broken by
    /// canonical-hash ordering. Returns whether the event was accepted as
    /// the current value for its replace-key.
    pub fn ingest(&self, event: MarketplaceEvent) -> bool {
        let key = event.replace_key();
        let mut events = self.events.write().expect("lock poisoned");
        match events.get(&key) {
            Some(existing) if !event.supersedes(existing) => false,
            _ => {
                events.insert(key, event);
                true
            }
        }
    }

    pub fn get(&self, issuer: &Identifier, kind: EventKind, class: ServiceClass, d_tag: &str) -> Option<MarketplaceEvent> {
        let key = (issuer.clone(), kind.numeric(class), d_tag.to_string());
        self.events.read().expect("lock poisoned").get(&key).cloned()
    }

    /// All non-expired events, for discovery queries. Expired events are
    /// ignored in discovery responses.
    pub fn live(&self, now: Timestamp) -> Vec<MarketplaceEvent> {
        self.events
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|e| !e.is_expired(now))
            .cloned()
            .collect()
    }

    /// Drops events expired for longer than the GC grace period.
    pub fn garbage_collect(&self, now: Timestamp) -> usize {
        let mut events = self.events.write().expect("lock poisoned");
        let before = events.len();
        events.retain(|_, e| now < e.tags.expiration + GC_GRACE_SECS);
        before - events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::{ContentHash, EventTags};

    fn event(issuer: &str, d_tag: &str, created_at: Timestamp, expiration: Timestamp, hash: u8) -> MarketplaceEvent {
        let mut content_hash = ContentHash::genesis();
        content_hash.0[0] = hash;
        MarketplaceEvent {
            issuer: Identifier::new(issuer),
            kind: EventKind::Offer,
            class: ServiceClass::Advisor,
            created_at,
            tags: EventTags { d_tag: d_tag.to_string(), expiration, did: Identifier::new(issuer), ..Default::default() },
            content: serde_json::Value::Null,
            content_hash,
            sig: String::new(),
        }
    }

    #[test]
    fn newer_created_at_supersedes() {
        let cache = EventCache::new();
        assert!(cache.ingest(event("a", "d1", 100, 10_000, 1)));
        assert!(!cache.ingest(event("a", "d1", 50, 10_000, 1)));
        assert!(cache.ingest(event("a", "d1", 200, 10_000, 1)));
        let current = cache.get(&Identifier::new("a"), EventKind::Offer, ServiceClass::Advisor, "d1").unwrap();
        assert_eq!(current.created_at, 200);
    }

    #[test]
    fn ties_broken_by_hash() {
        let cache = EventCache::new();
        cache.ingest(event("a", "d1", 100, 10_000, 1));
        assert!(cache.ingest(event("a", "d1", 100, 10_000, 2)));
        let current = cache.get(&Identifier::new("a"), EventKind::Offer, ServiceClass::Advisor, "d1").unwrap();
        assert_eq!(current.content_hash.0[0], 2);
    }

    #[test]
    fn expired_events_are_excluded_from_live_but_survive_grace() {
        let cache = EventCache::new();
        cache.ingest(event("a", "d1", 100, 1_000, 1));
        assert!(cache.live(1_500).is_empty());
        assert_eq!(cache.garbage_collect(1_500), 0);
        assert_eq!(cache.garbage_collect(1_000 + GC_GRACE_SECS + 1), 1);
    }
}
