//! The external mint collaborator: an ecash-style blind-signature mint
//! that mints tokens and performs pre-flight `checkstate` on a backing
//! token. Mirrors the provider-registry pattern used for certificate
//! issuers elsewhere in this workspace: capabilities are probed once at
//! startup, not re-derived per call.

use covenant_core::{Amount, CovenantError, SpendingCondition};

/// Capabilities every mint must advertise before this manager will mint
/// tickets against it. The `NUT-10`/`NUT-11`/`NUT-14` capability set is
/// verified at startup.
pub const REQUIRED_MINT_CAPABILITIES: &[&str] = &["NUT-10", "NUT-11", "NUT-14"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenState {
    Unspent,
    Spent,
    Unknown,
}

/// The narrow interface to an external ecash-style mint.
pub trait Mint: Send + Sync {
    fn advertised_capabilities(&self) -> Vec<String>;

    /// Pre-flight state probe on a backing token, run before a ticket is
    /// trusted as mintable.
    fn checkstate(&self, backing_token: &str) -> Result<TokenState, CovenantError>;

    /// Mints a token backing the given amount and spending condition,
    /// returning an opaque backing-token identifier.
    fn mint(&self, amount: Amount, condition: &SpendingCondition) -> Result<String, CovenantError>;

    /// Redeems the backing token given the revealed preimage.
    fn redeem(&self, backing_token: &str, preimage: &[u8]) -> Result<(), CovenantError>;
}

pub fn verify_capabilities(mint: &dyn Mint) -> Result<(), CovenantError> {
    let advertised = mint.advertised_capabilities();
    let missing: Vec<&str> = REQUIRED_MINT_CAPABILITIES
        .iter()
        .filter(|c| !advertised.iter().any(|a| a == *c))
        .copied()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CovenantError::MintUnavailable(format!("mint missing capabilities: {missing:?}")))
    }
}
