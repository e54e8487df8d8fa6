use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount of satoshis. All escrow, obligation and bond amounts are denominated
/// in this unit.
pub type Amount = u64;

/// Unix timestamp, seconds.
pub type Timestamp = i64;

/// Per-issuer strictly-monotonic operation nonce.
pub type Nonce = u64;

/// Monotonic receipt sequence index.
pub type Seq = u64;

/// Settlement-window identifier, e.g. daily or weekly; represented here as
/// an opaque caller-assigned string so the orchestrator can name windows
/// per its own schedule.
pub type WindowId = String;

/// Content-addressed hash: `blake3` digest of a canonical encoding.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        ContentHash(*blake3::hash(bytes).as_bytes())
    }

    pub fn genesis() -> Self {
        ContentHash([0u8; 32])
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({}…)", &self.as_hex()[..12])
    }
}

/// An identifier: an opaque string naming a principal (node operator,
/// advisor, counterparty). Resolved to a public key by the Identity
/// Resolver (C1).
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Identifier(s.into())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

/// Dilithium2 public key, held opaquely outside the crypto crate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(pub Vec<u8>);

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}…)", &hex::encode(&self.0)[..12.min(self.0.len() * 2)])
    }
}

/// Dilithium2 signature.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}…)", &hex::encode(&self.0)[..12.min(self.0.len() * 2)])
    }
}

/// Hash-lock preimage commitment: `h = H(secret)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashLock(pub [u8; 32]);

impl fmt::Debug for HashLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashLock({})", hex::encode(self.0))
    }
}
