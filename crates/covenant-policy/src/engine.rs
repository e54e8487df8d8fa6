use crate::config::PolicyConfig;
use crate::queue::{ConfirmationQueue, Handle, QueueResolution};
use crate::rate_limit::RateLimiter;
use covenant_core::{Amount, CovenantError, Identifier, Timestamp};

/// Everything the Policy Engine needs to evaluate a single operation
///. `resource` and `counterparty` are optional since not
/// every schema touches a named channel/peer.
pub struct PolicyRequest<'a> {
    pub issuer: &'a Identifier,
    pub schema: &'a str,
    pub danger: u8,
    pub resource: Option<&'a str>,
    pub counterparty: Option<&'a str>,
    pub amount: Option<Amount>,
    pub now: Timestamp,
    pub hour_utc: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PolicyDecision {
    Admit,
    Queued(Handle),
    Denied(CovenantError),
}

/// The Policy Engine: evaluates a fixed, ordered set
/// of rules against operator configuration. "First matching denial wins."
pub struct PolicyEngine {
    config: PolicyConfig,
    rate_limiter: RateLimiter,
    queue: ConfirmationQueue,
}

impl PolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config, rate_limiter: RateLimiter::new(), queue: ConfirmationQueue::new() }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PolicyConfig {
        &mut self.config
    }

    /// Evaluates the rules in the mandated order: protected-resource ⇒
    /// forbidden-counterparty ⇒ quiet-hours ⇒ rate-limit ⇒ numeric-cap ⇒
    /// danger-threshold. The first matching denial wins; a danger score
    /// over the effective autoexec ceiling queues for operator confirmation
    /// rather than denying outright.
    pub fn evaluate(&mut self, req: &PolicyRequest) -> PolicyDecision {
        if let Some(resource) = req.resource {
            if self.config.protected_resources.iter().any(|r| r == resource) {
                return PolicyDecision::Denied(CovenantError::PolicyDenied(format!(
                    "resource {resource} is protected"
                )));
            }
        }

        if let Some(counterparty) = req.counterparty {
            if self.config.forbidden_counterparties.iter().any(|c| c == counterparty) {
                return PolicyDecision::Denied(CovenantError::PolicyDenied(format!(
                    "counterparty {counterparty} is forbidden"
                )));
            }
        }

        if let Some(quiet) = &self.config.quiet_hours {
            if quiet.contains(req.hour_utc) && req.schema != "monitor/v1" {
                return PolicyDecision::Denied(CovenantError::PolicyDenied(
                    "quiet hours: only monitor/v1 admitted".into(),
                ));
            }
        }

        if !self.rate_limiter.try_consume(req.issuer, req.schema, req.now, &self.config.rate_limits) {
            return PolicyDecision::Denied(CovenantError::PolicyDenied(format!(
                "rate limit exceeded for {}/{}",
                req.issuer, req.schema
            )));
        }

        if let Some(amount) = req.amount {
            let cap = self.config.effective_max_rebalance_amount(req.now);
            if amount > cap {
                return PolicyDecision::Denied(CovenantError::BudgetExceeded(format!(
                    "amount {amount} exceeds cap {cap}"
                )));
            }
        }

        let ceiling = self.config.effective_max_danger_autoexec(req.now);
        if req.danger > ceiling {
            let handle = self.queue.enqueue(req.danger, req.now);
            return PolicyDecision::Queued(handle);
        }

        PolicyDecision::Admit
    }

    pub fn confirm(&mut self, handle: Handle, approve: bool) -> Option<QueueResolution> {
        self.queue.resolve(handle, approve)
    }

    pub fn check_queue(&mut self, handle: Handle, now: Timestamp) -> Option<QueueResolution> {
        self.queue.check(handle, now)
    }

    pub fn sweep_queue(&mut self, now: Timestamp) -> Vec<Handle> {
        self.queue.sweep_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;

    fn req<'a>(issuer: &'a Identifier, schema: &'a str, danger: u8) -> PolicyRequest<'a> {
        PolicyRequest {
            issuer,
            schema,
            danger,
            resource: None,
            counterparty: None,
            amount: None,
            now: 1_700_000_000,
            hour_utc: 12,
        }
    }

    #[test]
    fn protected_resource_denies_before_anything_else() {
        let mut cfg = PolicyConfig::new(Preset::Aggressive);
        cfg.protected_resources.push("chan-1".into());
        let mut engine = PolicyEngine::new(cfg);
        let issuer = Identifier::new("advisor-1");
        let mut r = req(&issuer, "channel/v1", 1);
        r.resource = Some("chan-1");
        assert!(matches!(engine.evaluate(&r), PolicyDecision::Denied(_)));
    }

    #[test]
    fn high_danger_queues_instead_of_executing() {
        let cfg = PolicyConfig::new(Preset::Conservative);
        let mut engine = PolicyEngine::new(cfg);
        let issuer = Identifier::new("advisor-1");
        let r = req(&issuer, "channel/v1", 7);
        match engine.evaluate(&r) {
            PolicyDecision::Queued(handle) => assert_eq!(handle, 1),
            other => panic!("expected queued, got {other:?}"),
        }
    }

    #[test]
    fn low_danger_within_caps_admits() {
        let cfg = PolicyConfig::new(Preset::Moderate);
        let mut engine = PolicyEngine::new(cfg);
        let issuer = Identifier::new("advisor-1");
        let r = req(&issuer, "monitor/v1", 1);
        assert_eq!(engine.evaluate(&r), PolicyDecision::Admit);
    }
}
