//! Identity Resolver client (C1): resolves an identifier to a public key,
//! issuer DID-doc, revocation flag; caches with TTL; fails closed on miss.
//! The distributed identity resolver itself is an external collaborator
//! — this module is the narrow client interface to it.

use covenant_core::constants::CREDENTIAL_CACHE_TTL_SECS;
use covenant_core::{CovenantError, Identifier, ResolvedIdentity, Timestamp};
use std::collections::HashMap;
use std::sync::RwLock;

/// The external identity resolver's interface: resolves an identifier to
/// a public key and revocation status.
pub trait IdentityResolverClient: Send + Sync {
    fn resolve(&self, identifier: &Identifier) -> Result<ResolvedIdentity, CovenantError>;
}

struct CacheEntry {
    identity: ResolvedIdentity,
    cached_at: Timestamp,
}

/// Wraps an `IdentityResolverClient` with a bounded TTL cache and
/// fail-closed semantics: absent a non-expired negative answer, reject
/// with `Unverifiable`.
pub struct CachingResolver {
    inner: Box<dyn IdentityResolverClient>,
    cache: RwLock<HashMap<Identifier, CacheEntry>>,
    ttl_secs: i64,
}

impl CachingResolver {
    pub fn new(inner: Box<dyn IdentityResolverClient>) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            ttl_secs: CREDENTIAL_CACHE_TTL_SECS,
        }
    }

    pub fn with_ttl(inner: Box<dyn IdentityResolverClient>, ttl_secs: i64) -> Self {
        Self { inner, cache: RwLock::new(HashMap::new()), ttl_secs }
    }

    /// Resolves `identifier`, serving a fresh cache entry if present,
    /// otherwise querying the underlying resolver. On resolver failure,
    /// falls back to an expired cache entry only if it records revocation
    /// (a "cached non-expired negative answer" is itself fail-closed-safe to
    /// reuse); any other failure is `Unverifiable`.
    pub fn resolve(&self, identifier: &Identifier, now: Timestamp) -> Result<ResolvedIdentity, CovenantError> {
        if let Some(entry) = self.cache.read().unwrap().get(identifier) {
            if now - entry.cached_at <= self.ttl_secs {
                return Ok(entry.identity.clone());
            }
        }
        match self.inner.resolve(identifier) {
            Ok(identity) => {
                self.cache
                    .write()
                    .unwrap()
                    .insert(identifier.clone(), CacheEntry { identity: identity.clone(), cached_at: now });
                Ok(identity)
            }
            Err(e) => {
                if let Some(entry) = self.cache.read().unwrap().get(identifier) {
                    if entry.identity.revoked {
                        return Ok(entry.identity.clone());
                    }
                }
                Err(CovenantError::Unverifiable(format!(
                    "identity resolver unreachable for {identifier}: {e}"
                )))
            }
        }
    }

    pub fn invalidate(&self, identifier: &Identifier) {
        self.cache.write().unwrap().remove(identifier);
    }

    /// Drops all cache entries older than their TTL, used by the
    /// Orchestration Loop's hourly revocation-cache refresh (C14).
    pub fn evict_expired(&self, now: Timestamp) {
        self.cache.write().unwrap().retain(|_, e| now - e.cached_at <= self.ttl_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::PublicKey;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyResolver {
        calls: AtomicU32,
        fail_after: u32,
    }

    impl IdentityResolverClient for FlakyResolver {
        fn resolve(&self, identifier: &Identifier) -> Result<ResolvedIdentity, CovenantError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n >= self.fail_after {
                return Err(CovenantError::Other("resolver down".into()));
            }
            Ok(ResolvedIdentity {
                identifier: identifier.clone(),
                public_key: PublicKey(vec![1, 2, 3]),
                revoked: false,
                resolved_at: 0,
            })
        }
    }

    #[test]
    fn fails_closed_with_no_cache() {
        let resolver = CachingResolver::new(Box::new(FlakyResolver { calls: AtomicU32::new(0), fail_after: 0 }));
        let err = resolver.resolve(&Identifier::new("advisor-1"), 1000).unwrap_err();
        assert!(matches!(err, CovenantError::Unverifiable(_)));
    }

    #[test]
    fn caches_within_ttl() {
        let resolver = CachingResolver::new(Box::new(FlakyResolver { calls: AtomicU32::new(0), fail_after: 1 }));
        let id = Identifier::new("advisor-1");
        assert!(resolver.resolve(&id, 1000).is_ok());
        // Second call within TTL should be served from cache, not hit the
        // now-failing resolver.
        assert!(resolver.resolve(&id, 1001).is_ok());
    }
}
