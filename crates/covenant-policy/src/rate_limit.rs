use crate::config::RateLimitConfig;
use covenant_core::{Identifier, Timestamp};
use std::collections::HashMap;

struct Bucket {
    tokens: f64,
    last_refill: Timestamp,
}

/// Per-`(issuer, schema)` token bucket rate limiter.
#[derive(Default)]
pub struct RateLimiter {
    buckets: HashMap<(Identifier, String), Bucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to consume one token for `(issuer, schema)` at time `now`.
    /// Returns `true` if the operation is admitted.
    pub fn try_consume(
        &mut self,
        issuer: &Identifier,
        schema: &str,
        now: Timestamp,
        cfg: &RateLimitConfig,
    ) -> bool {
        let key = (issuer.clone(), schema.to_string());
        let bucket = self.buckets.entry(key).or_insert_with(|| Bucket {
            tokens: cfg.capacity as f64,
            last_refill: now,
        });
        let elapsed = (now - bucket.last_refill).max(0) as f64;
        bucket.tokens = (bucket.tokens + elapsed * cfg.refill_per_sec).min(cfg.capacity as f64);
        bucket.last_refill = now;
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausts_then_refills() {
        let mut rl = RateLimiter::new();
        let cfg = RateLimitConfig { capacity: 2, refill_per_sec: 1.0 };
        let issuer = Identifier::new("advisor-1");
        assert!(rl.try_consume(&issuer, "monitor/v1", 0, &cfg));
        assert!(rl.try_consume(&issuer, "monitor/v1", 0, &cfg));
        assert!(!rl.try_consume(&issuer, "monitor/v1", 0, &cfg));
        assert!(rl.try_consume(&issuer, "monitor/v1", 2, &cfg));
    }
}
