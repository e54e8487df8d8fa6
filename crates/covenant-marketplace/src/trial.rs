//! Trial evaluation: a pure function over receipt outcomes.

use covenant_core::{ContractStatus, Receipt};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialVerdict {
    Pass,
    Fail,
    BadFaith,
}

/// Trial evaluation: a pure function over the trial window's receipts
/// producing Pass/Fail, with a separate bad-faith flag (set by the caller
/// from a resolved dispute finding against the provider) overriding the
/// pass ratio entirely.
pub fn evaluate_trial(receipts: &[Receipt], bad_faith_found: bool, min_pass_ratio: f64) -> TrialVerdict {
    if bad_faith_found {
        return TrialVerdict::BadFaith;
    }
    if receipts.is_empty() {
        return TrialVerdict::Fail;
    }
    let passed = receipts.iter().filter(|r| r.is_success()).count() as f64;
    if passed / receipts.len() as f64 >= min_pass_ratio {
        TrialVerdict::Pass
    } else {
        TrialVerdict::Fail
    }
}

/// The contract status transition implied by a trial verdict: a pass
/// continues to `Active`; a clean fail transitions to
/// `Terminated(reasonable)` with no reputation penalty; detected bad faith
/// transitions to `Terminated(forcause)` with reputation `revoke`.
pub fn transition_for_verdict(verdict: TrialVerdict) -> ContractStatus {
    match verdict {
        TrialVerdict::Pass => ContractStatus::Active,
        TrialVerdict::Fail => ContractStatus::TerminatedReasonable,
        TrialVerdict::BadFaith => ContractStatus::TerminatedForCause,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::{ContentHash, ExecutionResult, Identifier, OperationEnvelope};

    fn receipt(success: bool) -> Receipt {
        Receipt {
            seq: 1,
            prev: ContentHash::genesis(),
            op: OperationEnvelope {
                schema: "fee-policy/v1".into(),
                action: "set_anchor".into(),
                params: serde_json::json!({}),
                issuer: Identifier::new("advisor-1"),
                nonce: 1,
                ts: "2026-01-01T00:00:00Z".into(),
                credential_ref: ContentHash::genesis(),
                sig: String::new(),
            },
            state_before: ContentHash::genesis(),
            state_after: ContentHash::genesis(),
            result: if success { ExecutionResult::Success } else { ExecutionResult::Failure { reason: "rpc failed".into() } },
            ts: "2026-01-01T00:00:00Z".into(),
            issuer_sig: "ab".into(),
            node_sig: "cd".into(),
        }
    }

    #[test]
    fn passes_above_threshold() {
        let receipts = vec![receipt(true), receipt(true), receipt(false)];
        assert_eq!(evaluate_trial(&receipts, false, 0.5), TrialVerdict::Pass);
    }

    #[test]
    fn bad_faith_overrides_pass_ratio() {
        let receipts = vec![receipt(true), receipt(true)];
        assert_eq!(evaluate_trial(&receipts, true, 0.1), TrialVerdict::BadFaith);
    }

    #[test]
    fn empty_receipt_history_fails() {
        assert_eq!(evaluate_trial(&[], false, 0.0), TrialVerdict::Fail);
    }
}
