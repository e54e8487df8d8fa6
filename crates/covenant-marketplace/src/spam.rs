//! Ingress spam resistance: proof-of-work floor and per-issuer-per-kind
//! rate limits.

use covenant_core::{EventKind, Identifier};
use covenant_crypto::verify_pow;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct SpamGuard {
    min_difficulty: u8,
    max_per_window: u32,
    window_secs: i64,
    seen: Mutex<HashMap<(Identifier, EventKind), Vec<i64>>>,
}

impl SpamGuard {
    pub fn new(min_difficulty: u8, max_per_window: u32, window_secs: i64) -> Self {
        Self { min_difficulty, max_per_window, window_secs, seen: Mutex::new(HashMap::new()) }
    }

    /// Rejects events below the PoW floor or beyond the issuer's rate limit
    /// for this kind within the trailing window.
    pub fn admit(&self, issuer: &Identifier, kind: EventKind, event_bytes: &[u8], nonce: u64, now: i64) -> bool {
        if !verify_pow(event_bytes, nonce, self.min_difficulty) {
            return false;
        }
        let mut seen = self.seen.lock().expect("lock poisoned");
        let timestamps = seen.entry((issuer.clone(), kind)).or_default();
        timestamps.retain(|t| now - t < self.window_secs);
        if timestamps.len() as u32 >= self.max_per_window {
            return false;
        }
        timestamps.push(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_crypto::mine_pow;

    #[test]
    fn rejects_insufficient_pow() {
        let guard = SpamGuard::new(16, 10, 3_600);
        assert!(!guard.admit(&Identifier::new("a"), EventKind::Offer, b"event", 0, 0));
    }

    #[test]
    fn enforces_rate_limit_after_pow_passes() {
        let guard = SpamGuard::new(4, 2, 3_600);
        let nonce = mine_pow(b"event", 4);
        assert!(guard.admit(&Identifier::new("a"), EventKind::Offer, b"event", nonce, 0));
        assert!(guard.admit(&Identifier::new("a"), EventKind::Offer, b"event", nonce, 10));
        assert!(!guard.admit(&Identifier::new("a"), EventKind::Offer, b"event", nonce, 20));
    }
}
