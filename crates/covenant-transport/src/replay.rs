//! Inbound replay cache, independent of the credential engine's per-issuer
//! nonce replay guard — this one dedups at the transport layer so a relay
//! echoing the same event twice does not reach higher layers twice.

use covenant_core::{ContentHash, Timestamp};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct ReplayCache {
    ttl_secs: Timestamp,
    seen: Mutex<HashMap<ContentHash, Timestamp>>,
}

impl ReplayCache {
    pub fn new(ttl_secs: Timestamp) -> Self {
        Self { ttl_secs, seen: Mutex::new(HashMap::new()) }
    }

    /// Returns `true` if `hash` has not been seen within the TTL window,
    /// recording it as seen as a side effect.
    pub fn admit(&self, hash: ContentHash, now: Timestamp) -> bool {
        let mut seen = self.seen.lock().expect("lock poisoned");
        seen.retain(|_, t| now - *t < self.ttl_secs);
        if seen.contains_key(&hash) {
            false
        } else {
            seen.insert(hash, now);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_within_ttl_is_rejected() {
        let cache = ReplayCache::new(100);
        let hash = ContentHash::genesis();
        assert!(cache.admit(hash, 0));
        assert!(!cache.admit(hash, 50));
    }

    #[test]
    fn duplicate_after_ttl_is_readmitted() {
        let cache = ReplayCache::new(100);
        let hash = ContentHash::genesis();
        assert!(cache.admit(hash, 0));
        assert!(cache.admit(hash, 200));
    }
}
