//! Protocol constants. Grouped by the component that owns them; each is
//! referenced by name from the component's module so thresholds stay in
//! one place.

// ── Replay / Nonce Guard (C3) ────────────────────────────────────────────────

/// Maximum allowed clock skew between an operation's timestamp and the
/// receiving node's clock: `|now − ts| ≤ 300 s`.
pub const MAX_CLOCK_SKEW_SECS: i64 = 300;

// ── Credential cache (C1/C2) ─────────────────────────────────────────────────

/// Identity-resolver cache TTL ceiling.
pub const CREDENTIAL_CACHE_TTL_SECS: i64 = 3_600;

// ── Policy Engine (C4) ────────────────────────────────────────────────────────

/// Confirmation-queue timeout for danger tier 7 and above (hours).
pub const POLICY_CONFIRM_TIMEOUT_HIGH_DANGER_SECS: i64 = 4 * 3_600;

/// Confirmation-queue timeout for danger tier 5–6 (hours).
pub const POLICY_CONFIRM_TIMEOUT_MID_DANGER_SECS: i64 = 24 * 3_600;

/// Danger score at/above which the high-danger timeout applies.
pub const HIGH_DANGER_THRESHOLD: u8 = 7;

/// Danger score at/above which the mid-danger timeout applies.
pub const MID_DANGER_THRESHOLD: u8 = 5;

// ── Obligation extraction (C1 pipeline step 8) ─────────────────────────────

/// Flat billing amount recorded for each successfully executed operation
/// when no pricing schedule overrides it.
pub const DEFAULT_PER_ACTION_OBLIGATION_AMOUNT: u64 = 10;

// ── Execution retry (C1 pipeline step 6) ─────────────────────────────────────

/// Bounded retry attempts for `NodeRpcFailure(retryable)`.
pub const MAX_RPC_RETRY_ATTEMPTS: u32 = 3;

// ── Receipt Ledger (C6) ───────────────────────────────────────────────────────

/// Default cadence for Merkle-summary export (seconds).
pub const DEFAULT_MERKLE_EXPORT_INTERVAL_SECS: i64 = 3_600;

// ── Escrow Manager (C7) ───────────────────────────────────────────────────────

/// Grace period after timelock expiry before the background scanner marks a
/// ticket `Expired` and attempts reclaim.
pub const ESCROW_EXPIRY_GRACE_SECS: i64 = 600;

/// Secret zeroization delay after a ticket is refunded (days).
pub const SECRET_ZEROIZE_AFTER_REFUND_DAYS: i64 = 1;

/// Maximum distinct checkpoints in a milestone ticket.
pub const MAX_MILESTONE_CHECKPOINTS: usize = 32;

// ── Netting Engine (C9) ───────────────────────────────────────────────────────

/// Default bounded wait for netting-proposal quorum.
pub const NETTING_QUORUM_WAIT_SECS: i64 = 2 * 3_600;

/// Maximum counterparties netted together before deterministic partitioning
/// into sub-groups kicks in.
pub const NETTING_MAX_GROUP_SIZE: usize = 256;

// ── Dispute / Arbitration (C10) ───────────────────────────────────────────────

/// Panel sizes by eligible-member count.
pub const PANEL_SIZE_LARGE: usize = 7; // ≥15 eligible: 5-of-7
pub const PANEL_SIZE_MEDIUM: usize = 5; // else: 3-of-5
pub const PANEL_SIZE_SMALL: usize = 3; // else: 2-of-3
pub const PANEL_ELIGIBLE_THRESHOLD_LARGE: usize = 15;
pub const PANEL_ELIGIBLE_THRESHOLD_MEDIUM: usize = 5;

/// Bilateral cooling-period fallback when fewer than 3 members are eligible.
pub const DISPUTE_BILATERAL_COOLING_DAYS: i64 = 7;

/// Window within which a panel member must vote or forfeit their temporary
/// bond.
pub const PANEL_VOTE_WINDOW_SECS: i64 = 72 * 3_600;

// ── Bond Manager (C11) ────────────────────────────────────────────────────────

/// Tenure (days) at which effective bond weight saturates to 1.0.
pub const BOND_FULL_WEIGHT_TENURE_DAYS: f64 = 180.0;

/// Fraction of the existing membership's median bond a new member must post
/// at minimum, in addition to the protocol base minimum.
pub const NEW_MEMBER_MIN_BOND_MEDIAN_FRACTION: f64 = 0.5;

// ── Marketplace (C12) ─────────────────────────────────────────────────────────

/// Default discovery ranking weights
/// `(rep, capMatch, specMatch, priceFit, availability, freshness)`.
pub const DEFAULT_RANKING_WEIGHTS: (f64, f64, f64, f64, f64, f64) =
    (0.35, 0.25, 0.15, 0.10, 0.10, 0.05);

/// Maximum counter-proposal rounds in contract formation.
pub const MAX_COUNTER_ROUNDS: u32 = 5;

/// Default per-round counter-proposal expiry (hours).
pub const COUNTER_ROUND_EXPIRY_SECS: i64 = 72 * 3_600;

/// Default heartbeat interval for active contracts (hours).
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: i64 = 3_600;

/// Consecutive missed heartbeats before a contract is terminated.
pub const HEARTBEAT_MISSES_BEFORE_TERMINATE: u32 = 3;

/// Kind 38383 transition window: both the legacy
/// (advisor-profile) and reassigned (contract-confirmation) meanings are
/// accepted on ingress until this many seconds after the reassignment is
/// configured to take effect.
pub const KIND_38383_TRANSITION_WINDOW_SECS: i64 = 30 * 24 * 3_600;

// ── Orchestration Loop (C14) ──────────────────────────────────────────────────

pub const ORCHESTRATOR_SETTLEMENT_TICK_SECS: u64 = 3_600;
pub const ORCHESTRATOR_ESCROW_SCAN_TICK_SECS: u64 = 60;
pub const ORCHESTRATOR_REVOCATION_REFRESH_TICK_SECS: u64 = 3_600;
pub const ORCHESTRATOR_BOND_MONITOR_TICK_SECS: u64 = 3_600;
