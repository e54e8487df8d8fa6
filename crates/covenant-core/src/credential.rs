use crate::canonical::canonical_hash;
use crate::error::CovenantError;
use crate::types::{ContentHash, Identifier, PublicKey, Signature, Timestamp};
use serde::{Deserialize, Serialize};

/// Permission bits a `ManagementCredential` may grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Monitor,
    FeePolicy,
    Rebalance,
    ConfigTune,
    ChannelOpen,
    ChannelClose,
    Emergency,
}

/// Numeric constraint attached to a credential, e.g. `max_fee_change_pct`.
/// Stored as a flat map so new constraint kinds never require a schema
/// migration (mirrors the `#[serde(default)]` additive-field convention used
/// throughout this workspace's entity types).
pub type ConstraintMap = std::collections::BTreeMap<String, f64>;

/// Lifecycle state of a credential: `Active → (Renewed ∥ Expired ∥ Revoked)`.
/// Revocation is immediate and fail-closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Active,
    Renewed,
    Expired,
    Revoked,
}

/// A verifiable credential: a signed assertion binding a subject identifier
/// to a validity window, with up to two independent issuer signatures.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifiableCredential {
    pub issuer: Identifier,
    pub issuer_key: PublicKey,
    pub subject: Identifier,
    pub credential_type: String,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub constraints: ConstraintMap,
    pub signatures: Vec<Signature>,
    #[serde(default)]
    pub status: Option<CredentialStatus>,
    #[serde(default)]
    pub revoked_at: Option<Timestamp>,
}

impl VerifiableCredential {
    /// Content-hash identity of this credential. Computed over everything
    /// except mutable lifecycle fields (`status`, `revoked_at`), matching
    /// the pattern that a credential's identity is fixed at issuance.
    pub fn content_hash(&self) -> Result<ContentHash, CovenantError> {
        #[derive(Serialize)]
        struct Identity<'a> {
            issuer: &'a Identifier,
            subject: &'a Identifier,
            credential_type: &'a str,
            valid_from: Timestamp,
            valid_until: Timestamp,
            constraints: &'a ConstraintMap,
        }
        canonical_hash(&Identity {
            issuer: &self.issuer,
            subject: &self.subject,
            credential_type: &self.credential_type,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            constraints: &self.constraints,
        })
    }

    /// `validFrom ≤ now < validUntil` and not revoked. `now == valid_from`
    /// accepts; `now == valid_until` rejects.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        if matches!(self.status, Some(CredentialStatus::Revoked)) {
            return false;
        }
        self.valid_from <= now && now < self.valid_until
    }
}

/// A `ManagementCredential`: extends a `VerifiableCredential` with a
/// permission set and an allowed operation-schema glob list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ManagementCredential {
    pub credential: VerifiableCredential,
    pub permissions: Vec<Permission>,
    pub allowed_schemas: Vec<String>,
}

impl ManagementCredential {
    pub fn content_hash(&self) -> Result<ContentHash, CovenantError> {
        self.credential.content_hash()
    }

    pub fn has_permission(&self, perm: Permission) -> bool {
        self.permissions.contains(&perm)
    }

    /// Glob match against `allowed_schemas`. A glob is `prefix/*` or an
    /// exact match.
    pub fn allows_schema(&self, schema_id: &str) -> bool {
        self.allowed_schemas.iter().any(|glob| match glob.strip_suffix('*') {
            Some(prefix) => schema_id.starts_with(prefix),
            None => glob == schema_id,
        })
    }

    pub fn constraint(&self, key: &str) -> Option<f64> {
        self.credential.constraints.get(key).copied()
    }
}

/// Result of resolving an `Identifier` to a controlling public key and
/// revocation flag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub identifier: Identifier,
    pub public_key: PublicKey,
    pub revoked: bool,
    pub resolved_at: Timestamp,
}
