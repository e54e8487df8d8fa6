use covenant_core::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// Baseline preset: sets default numeric caps
/// before any per-operator override is layered on top. Mirrors the
/// trivial/standard/elevated lane-threshold pattern used elsewhere in this
/// workspace for tiered numeric limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Conservative,
    Moderate,
    Aggressive,
}

/// Numeric caps a preset establishes as defaults: max fee-change window %,
/// max rebalance amount, max per-period action count, confirmation
/// threshold.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PresetDefaults {
    pub max_fee_change_per_24h_pct: f64,
    pub max_rebalance_amount: Amount,
    pub max_actions_per_period: u32,
    pub max_danger_autoexec: u8,
}

impl Preset {
    pub fn defaults(&self) -> PresetDefaults {
        match self {
            Preset::Conservative => PresetDefaults {
                max_fee_change_per_24h_pct: 10.0,
                max_rebalance_amount: 1_000_000,
                max_actions_per_period: 20,
                max_danger_autoexec: 3,
            },
            Preset::Moderate => PresetDefaults {
                max_fee_change_per_24h_pct: 50.0,
                max_rebalance_amount: 10_000_000,
                max_actions_per_period: 100,
                max_danger_autoexec: 5,
            },
            Preset::Aggressive => PresetDefaults {
                max_fee_change_per_24h_pct: 200.0,
                max_rebalance_amount: 100_000_000,
                max_actions_per_period: 500,
                max_danger_autoexec: 7,
            },
        }
    }
}

/// `quiet_hours`: a UTC hour-of-day range (inclusive start, exclusive end,
/// wrapping past midnight allowed) during which only `monitor` schema
/// operations are admitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuietHours {
    pub start_hour_utc: u8,
    pub end_hour_utc: u8,
}

impl QuietHours {
    pub fn contains(&self, hour_utc: u8) -> bool {
        if self.start_hour_utc <= self.end_hour_utc {
            hour_utc >= self.start_hour_utc && hour_utc < self.end_hour_utc
        } else {
            hour_utc >= self.start_hour_utc || hour_utc < self.end_hour_utc
        }
    }
}

/// Per-issuer-per-schema token bucket configuration (`rate_limits`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub capacity: u32,
    pub refill_per_sec: f64,
}

/// A transient operator override with a mandatory expiry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyOverride {
    pub max_danger_autoexec: Option<u8>,
    pub max_rebalance_amount: Option<Amount>,
    pub expires_at: Timestamp,
}

/// Full policy configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub preset: Preset,
    pub max_danger_autoexec: Option<u8>,
    pub max_fee_change_per_24h_pct: Option<f64>,
    pub max_rebalance_amount: Option<Amount>,
    pub daily_spend_cap: Option<Amount>,
    pub weekly_spend_cap: Option<Amount>,
    pub per_issuer_daily_cap: Option<Amount>,
    pub protected_resources: Vec<String>,
    pub forbidden_counterparties: Vec<String>,
    pub quiet_hours: Option<QuietHours>,
    pub rate_limits: RateLimitConfig,
    pub override_: Option<PolicyOverride>,
}

impl PolicyConfig {
    pub fn new(preset: Preset) -> Self {
        Self {
            preset,
            max_danger_autoexec: None,
            max_fee_change_per_24h_pct: None,
            max_rebalance_amount: None,
            daily_spend_cap: None,
            weekly_spend_cap: None,
            per_issuer_daily_cap: None,
            protected_resources: Vec::new(),
            forbidden_counterparties: Vec::new(),
            quiet_hours: None,
            rate_limits: RateLimitConfig { capacity: 60, refill_per_sec: 1.0 },
            override_: None,
        }
    }

    /// Effective `max_danger_autoexec`, applying a non-expired override over
    /// the explicit config over the preset default, in that priority order.
    pub fn effective_max_danger_autoexec(&self, now: Timestamp) -> u8 {
        if let Some(o) = &self.override_ {
            if now < o.expires_at {
                if let Some(v) = o.max_danger_autoexec {
                    return v;
                }
            }
        }
        self.max_danger_autoexec.unwrap_or_else(|| self.preset.defaults().max_danger_autoexec)
    }

    pub fn effective_max_rebalance_amount(&self, now: Timestamp) -> Amount {
        if let Some(o) = &self.override_ {
            if now < o.expires_at {
                if let Some(v) = o.max_rebalance_amount {
                    return v;
                }
            }
        }
        self.max_rebalance_amount.unwrap_or_else(|| self.preset.defaults().max_rebalance_amount)
    }

    pub fn effective_max_fee_change_pct(&self) -> f64 {
        self.max_fee_change_per_24h_pct.unwrap_or_else(|| self.preset.defaults().max_fee_change_per_24h_pct)
    }
}
