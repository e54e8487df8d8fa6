//! Policy Engine (C4): operator-configured guardrails sitting between
//! credential/scope verification and execution.

pub mod config;
pub mod engine;
pub mod queue;
pub mod rate_limit;

pub use config::{PolicyConfig, PolicyOverride, Preset, PresetDefaults, QuietHours, RateLimitConfig};
pub use engine::{PolicyDecision, PolicyEngine, PolicyRequest};
pub use queue::{ConfirmationQueue, Handle, QueueResolution};
pub use rate_limit::RateLimiter;
