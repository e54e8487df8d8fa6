use thiserror::Error;

/// The stable, machine-readable error surface of the core engine. Variants
/// are grouped into six kinds — input, trust, policy, execution, economic,
/// and consensus — each with a short stable `Display` code.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CovenantError {
    // ── Input errors ─────────────────────────────────────────────────────────
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("replay or clock skew: {0}")]
    ReplayOrSkew(String),

    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),

    // ── Trust errors ─────────────────────────────────────────────────────────
    #[error("unknown credential: {0}")]
    UnknownCredential(String),

    #[error("revoked credential: {0}")]
    RevokedCredential(String),

    #[error("credential unverifiable: {0}")]
    Unverifiable(String),

    #[error("operation out of credential scope")]
    OutOfScope,

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    // ── Policy errors ────────────────────────────────────────────────────────
    #[error("policy denied: {0}")]
    PolicyDenied(String),

    #[error("policy pending confirmation: handle {0}")]
    PolicyPending(u64),

    #[error("policy confirmation window expired")]
    PolicyExpired,

    // ── Execution errors ─────────────────────────────────────────────────────
    #[error("node RPC failure (retryable): {0}")]
    NodeRpcFailureRetryable(String),

    #[error("node RPC failure (fatal): {0}")]
    NodeRpcFailureFatal(String),

    #[error("mint unavailable: {0}")]
    MintUnavailable(String),

    #[error("receipt persistence failed: {0}")]
    ReceiptPersistenceFailed(String),

    // ── Economic errors ──────────────────────────────────────────────────────
    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    #[error("insufficient funds: need {need}, have {have}")]
    InsufficientFunds { need: u64, have: u64 },

    #[error("escrow ticket expired")]
    EscrowExpired,

    #[error("dispute raised on obligation {0}")]
    DisputeRaised(String),

    // ── Consensus errors ─────────────────────────────────────────────────────
    #[error("netting disagreement: {0}")]
    NettingDisagreement(String),

    #[error("quorum not reached")]
    QuorumNotReached,

    // ── Serialization / storage (ambient) ───────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("{0}")]
    Other(String),
}

impl CovenantError {
    /// Whether this execution failure should trigger the bounded retry
    /// policy. Only `NodeRpcFailure(retryable)` triggers an internal
    /// bounded retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CovenantError::NodeRpcFailureRetryable(_))
    }
}
