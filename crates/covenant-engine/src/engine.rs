//! The central pipeline (C1-C6): `submit(OperationEnvelope) -> SubmitOutcome`.
//! Obligation extraction (step 8, C8) runs after a receipt is durably
//! appended and hands the resulting `Obligation` to whatever
//! `ObligationSink` the engine was built with; `covenant-settlement`'s
//! `ObligationLedger` is the production implementation but this crate
//! only depends on the trait, not the ledger itself.

use crate::db::CovenantDb;
use crate::resolver::CachingResolver;
use crate::translator::{NodeRpc, SchemaTranslator};
use covenant_core::constants::{DEFAULT_PER_ACTION_OBLIGATION_AMOUNT, MAX_CLOCK_SKEW_SECS, MAX_RPC_RETRY_ATTEMPTS};
use covenant_core::{
    daily_window_id, ContentHash, CovenantError, ExecutionResult, Identifier, ManagementCredential, Obligation,
    ObligationKind, OperationEnvelope, Receipt, Seq, Signature, Timestamp,
};
use covenant_crypto::signing::Signer;
use covenant_policy::{PolicyDecision, PolicyEngine, PolicyRequest};
use std::sync::Mutex;

/// Where completed operations' billing obligations land. `covenant-node`
/// wires this to `covenant-settlement::ObligationLedger::append`; kept as a
/// trait so this crate does not need a dependency edge onto
/// `covenant-settlement`.
pub trait ObligationSink: Send + Sync {
    fn record(&self, obligation: Obligation);
}

impl<F: Fn(Obligation) + Send + Sync> ObligationSink for F {
    fn record(&self, obligation: Obligation) {
        (self)(obligation)
    }
}

/// A sink that drops every obligation; used where no settlement ledger is
/// configured (e.g. a monitor-only deployment).
pub struct NullObligationSink;

impl ObligationSink for NullObligationSink {
    fn record(&self, _obligation: Obligation) {}
}

pub struct Engine {
    db: CovenantDb,
    resolver: CachingResolver,
    translator: SchemaTranslator,
    policy: Mutex<PolicyEngine>,
    node: Box<dyn NodeRpc>,
    node_signer: Signer,
    node_identifier: Identifier,
    obligations: Box<dyn ObligationSink>,
}

impl Engine {
    pub fn new(
        db: CovenantDb,
        resolver: CachingResolver,
        translator: SchemaTranslator,
        policy: PolicyEngine,
        node: Box<dyn NodeRpc>,
        node_signer: Signer,
        node_identifier: Identifier,
        obligations: Box<dyn ObligationSink>,
    ) -> Self {
        Self { db, resolver, translator, policy: Mutex::new(policy), node, node_signer, node_identifier, obligations }
    }

    pub fn db(&self) -> &CovenantDb {
        &self.db
    }

    pub fn resolver(&self) -> &CachingResolver {
        &self.resolver
    }

    /// Runs the full pipeline and converts any stage failure into a
    /// `Rejected` outcome. A receipt durably appended to the ledger is
    /// always reported as `Executed`, even if its `result` is `Failure` —
    /// the operation reached the node and a tamper-evident record exists.
    pub fn submit(&self, op: OperationEnvelope, now: Timestamp) -> covenant_core::SubmitOutcome {
        match self.run_pipeline(&op, now) {
            Ok(seq) => covenant_core::SubmitOutcome::Executed { receipt_seq: seq },
            Err(e) => covenant_core::SubmitOutcome::Rejected { kind: error_kind(&e), detail: e.to_string() },
        }
    }

    fn run_pipeline(&self, op: &OperationEnvelope, now: Timestamp) -> Result<Seq, CovenantError> {
        // Step 1/2: structural validity + clock skew.
        if op.schema.is_empty() || op.action.is_empty() {
            return Err(CovenantError::MalformedEnvelope("schema and action must be non-empty".into()));
        }
        if !op.within_skew(now, MAX_CLOCK_SKEW_SECS)? {
            return Err(CovenantError::ReplayOrSkew("timestamp outside allowed clock skew".into()));
        }

        // Step 2: nonce strictly increasing per issuer (C3).
        let last_nonce = self.db.last_nonce(&op.issuer)?.unwrap_or(0);
        if op.nonce <= last_nonce {
            return Err(CovenantError::ReplayOrSkew(format!(
                "nonce {} is not greater than last seen {}",
                op.nonce, last_nonce
            )));
        }

        // Step 3: credential lookup, revocation, activity window, signature (C2).
        let credential = self
            .db
            .get_credential(&op.credential_ref)?
            .ok_or_else(|| CovenantError::UnknownCredential(op.credential_ref.to_string()))?;
        if self.db.is_revoked(&op.credential_ref)? {
            return Err(CovenantError::RevokedCredential(op.credential_ref.to_string()));
        }
        if !credential.credential.is_active_at(now) {
            return Err(CovenantError::RevokedCredential("credential outside validity window".into()));
        }
        let identity = self.resolver.resolve(&op.issuer, now)?;
        if identity.revoked {
            return Err(CovenantError::RevokedCredential(op.issuer.to_string()));
        }
        let signing_bytes = op.canonical_signing_bytes()?;
        let sig_bytes =
            hex::decode(&op.sig).map_err(|e| CovenantError::MalformedEnvelope(format!("sig not hex: {e}")))?;
        covenant_crypto::signing::verify(&identity.public_key, &signing_bytes, &Signature(sig_bytes))
            .map_err(|_| CovenantError::InvalidSignature)?;

        // The credential's subject must be the operation's issuer, or any
        // registered identifier could submit under another subject's
        // credential by quoting its content-hash as credential_ref.
        if credential.credential.subject != op.issuer {
            return Err(CovenantError::Unverifiable(
                "credential subject does not match operation issuer".into(),
            ));
        }
        // The credential's own issuer signature must verify under its
        // issuer_key, independent of the operation's own signature checked
        // above.
        let credential_hash = credential.credential.content_hash()?;
        let credential_signed_by_issuer = credential.credential.signatures.iter().any(|sig| {
            covenant_crypto::signing::verify(&credential.credential.issuer_key, credential_hash.0.as_slice(), sig)
                .is_ok()
        });
        if !credential_signed_by_issuer {
            return Err(CovenantError::Unverifiable("credential issuer signature does not verify".into()));
        }

        // Step 4: scope, permission, and constraint check.
        if !credential.allows_schema(&op.schema) {
            return Err(CovenantError::OutOfScope);
        }
        if let Some(required) = SchemaTranslator::required_permission(&op.schema, &op.action) {
            if !credential.has_permission(required) {
                return Err(CovenantError::OutOfScope);
            }
        }
        check_credential_constraints(&credential, &op.params)?;

        // Step 5: Policy Engine (C4). May reject, may enqueue for operator
        // confirmation — `PolicyPending` is surfaced to the caller as a
        // rejection; the queued handle resolves out of band via
        // `PolicyEngine::confirm`.
        let danger = self
            .translator
            .capability(&op.schema, &op.action)
            .ok_or_else(|| CovenantError::UnsupportedSchema(format!("{}/{}", op.schema, op.action)))?
            .danger;
        let hour_utc = ((now.rem_euclid(86_400)) / 3_600) as u8;
        let decision = {
            let mut policy = self.policy.lock().unwrap();
            policy.evaluate(&PolicyRequest {
                issuer: &op.issuer,
                schema: &op.schema,
                danger,
                resource: op.params.get("channel").and_then(|v| v.as_str()),
                counterparty: op.params.get("counterparty").and_then(|v| v.as_str()),
                amount: op.params.get("amount").and_then(|v| v.as_u64()),
                now,
                hour_utc,
            })
        };
        match decision {
            PolicyDecision::Denied(e) => return Err(e),
            PolicyDecision::Queued(handle) => return Err(CovenantError::PolicyPending(handle)),
            PolicyDecision::Admit => {}
        }

        // Step 6: translate and execute against the node, with bounded retry
        // on `NodeRpcFailureRetryable` only.
        let mut attempt = 0u32;
        let (state_before, result, state_after) = loop {
            match self.translator.translate_and_execute(self.node.as_ref(), &op.schema, &op.action, &op.params) {
                Ok(triple) => break triple,
                Err(e) if e.is_retryable() && attempt < MAX_RPC_RETRY_ATTEMPTS => {
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }
        };

        // Step 7: append a hash-chained, dually-signed receipt (C6).
        let seq = self.db.latest_seq()? + 1;
        let prev = if seq == 1 {
            ContentHash::genesis()
        } else {
            self.db
                .get_receipt(seq - 1)?
                .ok_or_else(|| CovenantError::Storage("missing predecessor receipt".into()))?
                .self_hash()?
        };
        let ts = chrono::DateTime::from_timestamp(now, 0)
            .ok_or_else(|| CovenantError::Other("timestamp out of range".into()))?
            .to_rfc3339();
        let mut receipt = Receipt {
            seq,
            prev,
            op: op.clone(),
            state_before,
            state_after,
            result,
            ts,
            issuer_sig: op.sig.clone(),
            node_sig: String::new(),
        };
        let node_sig = self
            .node_signer
            .sign(&receipt.node_signing_bytes()?)
            .map_err(|e| CovenantError::Other(e.to_string()))?;
        receipt.node_sig = hex::encode(&node_sig.0);

        self.db.put_receipt(&receipt)?;
        self.db.set_last_nonce(&op.issuer, op.nonce)?;

        // Step 8: derive the billing obligation this receipt creates and
        // hand it to whatever ledger is configured downstream.
        self.obligations.record(Obligation {
            window_id: daily_window_id(now),
            from: op.issuer.clone(),
            to: self.node_identifier.clone(),
            kind: ObligationKind::PerAction,
            reference: format!("{}/{}", op.schema, op.action),
            amount: DEFAULT_PER_ACTION_OBLIGATION_AMOUNT,
            receipt_id: seq,
            status: covenant_core::ObligationStatus::Pending,
        });

        Ok(seq)
    }
}

/// Step 4's numeric constraint check: every `max_<name>` entry in the
/// credential's `constraints` map bounds the same-named field in `params`,
/// when present. Constraint keys with no matching param are ignored —
/// they bound a different action's parameter, not this one.
fn check_credential_constraints(
    credential: &ManagementCredential,
    params: &serde_json::Value,
) -> Result<(), CovenantError> {
    for (key, &limit) in credential.credential.constraints.iter() {
        let Some(param_name) = key.strip_prefix("max_") else { continue };
        if let Some(value) = params.get(param_name).and_then(|v| v.as_f64()) {
            if value > limit {
                return Err(CovenantError::ConstraintViolation(format!(
                    "{param_name} {value} exceeds credential constraint {key}={limit}"
                )));
            }
        }
    }
    Ok(())
}

fn error_kind(e: &CovenantError) -> String {
    match e {
        CovenantError::MalformedEnvelope(_) => "malformed_envelope",
        CovenantError::InvalidSignature => "invalid_signature",
        CovenantError::ReplayOrSkew(_) => "replay_or_skew",
        CovenantError::UnsupportedSchema(_) => "unsupported_schema",
        CovenantError::UnknownCredential(_) => "unknown_credential",
        CovenantError::RevokedCredential(_) => "revoked_credential",
        CovenantError::Unverifiable(_) => "unverifiable",
        CovenantError::OutOfScope => "out_of_scope",
        CovenantError::ConstraintViolation(_) => "constraint_violation",
        CovenantError::PolicyDenied(_) => "policy_denied",
        CovenantError::PolicyPending(_) => "policy_pending",
        CovenantError::PolicyExpired => "policy_expired",
        CovenantError::NodeRpcFailureRetryable(_) => "node_rpc_failure_retryable",
        CovenantError::NodeRpcFailureFatal(_) => "node_rpc_failure_fatal",
        CovenantError::MintUnavailable(_) => "mint_unavailable",
        CovenantError::ReceiptPersistenceFailed(_) => "receipt_persistence_failed",
        CovenantError::BudgetExceeded(_) => "budget_exceeded",
        CovenantError::InsufficientFunds { .. } => "insufficient_funds",
        CovenantError::EscrowExpired => "escrow_expired",
        CovenantError::DisputeRaised(_) => "dispute_raised",
        CovenantError::NettingDisagreement(_) => "netting_disagreement",
        CovenantError::QuorumNotReached => "quorum_not_reached",
        CovenantError::Serialization(_) => "serialization",
        CovenantError::Storage(_) => "storage",
        CovenantError::NotFound(_) => "not_found",
        CovenantError::AlreadyExists(_) => "already_exists",
        CovenantError::Other(_) => "other",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::IdentityResolverClient;
    use covenant_core::{
        CredentialStatus, Identifier, ManagementCredential, OperationEnvelope, Permission, ResolvedIdentity,
        VerifiableCredential,
    };
    use covenant_crypto::signing::Signer;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_db_path() -> std::path::PathBuf {
        let n = TEST_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("covenant-engine-test-{}-{n}", std::process::id()))
    }

    struct StaticResolver {
        identity: ResolvedIdentity,
    }

    impl IdentityResolverClient for StaticResolver {
        fn resolve(&self, _identifier: &Identifier) -> Result<ResolvedIdentity, CovenantError> {
            Ok(self.identity.clone())
        }
    }

    struct FakeNode;

    impl NodeRpc for FakeNode {
        fn execute(
            &self,
            _schema: &str,
            _action: &str,
            _params: &serde_json::Value,
        ) -> Result<ExecutionResult, CovenantError> {
            Ok(ExecutionResult::Success)
        }

        fn state_hash(&self, schema: &str, action: &str) -> Result<ContentHash, CovenantError> {
            Ok(ContentHash::from_bytes(format!("{schema}/{action}").as_bytes()))
        }
    }

    /// Builds a `ManagementCredential` for `subject`, signed by `root_signer`
    /// as issuer, with the given permissions/schemas/constraints.
    fn build_credential(
        root_signer: &Signer,
        subject: &Identifier,
        permissions: Vec<Permission>,
        allowed_schemas: Vec<String>,
        constraints: covenant_core::ConstraintMap,
    ) -> ManagementCredential {
        let unsigned = VerifiableCredential {
            issuer: Identifier::new("root"),
            issuer_key: root_signer.public_key.clone(),
            subject: subject.clone(),
            credential_type: "management".into(),
            valid_from: 0,
            valid_until: 2_000_000_000,
            constraints,
            signatures: vec![],
            status: Some(CredentialStatus::Active),
            revoked_at: None,
        };
        let hash = unsigned.content_hash().unwrap();
        let sig = root_signer.sign(hash.0.as_slice()).unwrap();
        ManagementCredential {
            credential: VerifiableCredential { signatures: vec![sig], ..unsigned },
            permissions,
            allowed_schemas,
        }
    }

    fn build_engine(db: CovenantDb, resolver: CachingResolver) -> Engine {
        Engine::new(
            db,
            resolver,
            SchemaTranslator::default_capabilities(),
            PolicyEngine::new(covenant_policy::PolicyConfig::new(covenant_policy::Preset::Aggressive)),
            Box::new(FakeNode),
            Signer::generate(),
            Identifier::new("lnd-node-1"),
            Box::new(NullObligationSink),
        )
    }

    fn sign_op(op: &mut OperationEnvelope, issuer_signer: &Signer) {
        let sig = issuer_signer.sign(&op.canonical_signing_bytes().unwrap()).unwrap();
        op.sig = hex::encode(&sig.0);
    }

    #[test]
    fn accepted_operation_appends_a_receipt() {
        let dir = temp_db_path();
        let db = CovenantDb::open(&dir).unwrap();
        let root_signer = Signer::generate();
        let issuer_signer = Signer::generate();
        let advisor = Identifier::new("advisor-1");

        let credential = build_credential(
            &root_signer,
            &advisor,
            vec![Permission::FeePolicy],
            vec!["fee-policy/*".into()],
            Default::default(),
        );
        let cred_hash = credential.content_hash().unwrap();
        db.put_credential(&cred_hash, &credential).unwrap();

        let resolver = CachingResolver::new(Box::new(StaticResolver {
            identity: ResolvedIdentity {
                identifier: advisor.clone(),
                public_key: issuer_signer.public_key.clone(),
                revoked: false,
                resolved_at: 0,
            },
        }));

        let mut op = OperationEnvelope {
            schema: "fee-policy/v1".into(),
            action: "set_anchor".into(),
            params: json!({"channel": "chan-1", "fee_ppm": 150}),
            issuer: advisor,
            nonce: 1,
            ts: "2026-01-01T00:00:00Z".into(),
            credential_ref: cred_hash,
            sig: String::new(),
        };
        sign_op(&mut op, &issuer_signer);

        let engine = build_engine(db, resolver);
        let now = op.timestamp_unix().unwrap();
        let outcome = engine.submit(op, now);
        assert!(matches!(outcome, covenant_core::SubmitOutcome::Executed { receipt_seq: 1 }));
    }

    #[test]
    fn credential_for_another_subject_is_rejected() {
        let dir = temp_db_path();
        let db = CovenantDb::open(&dir).unwrap();
        let root_signer = Signer::generate();
        let issuer_signer = Signer::generate();
        let advisor = Identifier::new("advisor-1");
        let other = Identifier::new("advisor-2");

        // Credential is issued to `other`, not `advisor`.
        let credential = build_credential(
            &root_signer,
            &other,
            vec![Permission::FeePolicy],
            vec!["fee-policy/*".into()],
            Default::default(),
        );
        let cred_hash = credential.content_hash().unwrap();
        db.put_credential(&cred_hash, &credential).unwrap();

        let resolver = CachingResolver::new(Box::new(StaticResolver {
            identity: ResolvedIdentity {
                identifier: advisor.clone(),
                public_key: issuer_signer.public_key.clone(),
                revoked: false,
                resolved_at: 0,
            },
        }));

        let mut op = OperationEnvelope {
            schema: "fee-policy/v1".into(),
            action: "set_anchor".into(),
            params: json!({"channel": "chan-1", "fee_ppm": 150}),
            issuer: advisor,
            nonce: 1,
            ts: "2026-01-01T00:00:00Z".into(),
            credential_ref: cred_hash,
            sig: String::new(),
        };
        sign_op(&mut op, &issuer_signer);

        let engine = build_engine(db, resolver);
        let now = op.timestamp_unix().unwrap();
        let outcome = engine.submit(op, now);
        match outcome {
            covenant_core::SubmitOutcome::Rejected { kind, .. } => assert_eq!(kind, "unverifiable"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn missing_permission_bit_is_rejected() {
        let dir = temp_db_path();
        let db = CovenantDb::open(&dir).unwrap();
        let root_signer = Signer::generate();
        let issuer_signer = Signer::generate();
        let advisor = Identifier::new("advisor-1");

        // Schema is in scope but the FeePolicy permission bit is absent.
        let credential = build_credential(
            &root_signer,
            &advisor,
            vec![Permission::Monitor],
            vec!["fee-policy/*".into()],
            Default::default(),
        );
        let cred_hash = credential.content_hash().unwrap();
        db.put_credential(&cred_hash, &credential).unwrap();

        let resolver = CachingResolver::new(Box::new(StaticResolver {
            identity: ResolvedIdentity {
                identifier: advisor.clone(),
                public_key: issuer_signer.public_key.clone(),
                revoked: false,
                resolved_at: 0,
            },
        }));

        let mut op = OperationEnvelope {
            schema: "fee-policy/v1".into(),
            action: "set_anchor".into(),
            params: json!({"channel": "chan-1", "fee_ppm": 150}),
            issuer: advisor,
            nonce: 1,
            ts: "2026-01-01T00:00:00Z".into(),
            credential_ref: cred_hash,
            sig: String::new(),
        };
        sign_op(&mut op, &issuer_signer);

        let engine = build_engine(db, resolver);
        let now = op.timestamp_unix().unwrap();
        let outcome = engine.submit(op, now);
        match outcome {
            covenant_core::SubmitOutcome::Rejected { kind, .. } => assert_eq!(kind, "out_of_scope"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn numeric_constraint_breach_is_rejected() {
        let dir = temp_db_path();
        let db = CovenantDb::open(&dir).unwrap();
        let root_signer = Signer::generate();
        let issuer_signer = Signer::generate();
        let advisor = Identifier::new("advisor-1");

        let mut constraints = covenant_core::ConstraintMap::new();
        constraints.insert("max_fee_ppm".into(), 100.0);
        let credential = build_credential(
            &root_signer,
            &advisor,
            vec![Permission::FeePolicy],
            vec!["fee-policy/*".into()],
            constraints,
        );
        let cred_hash = credential.content_hash().unwrap();
        db.put_credential(&cred_hash, &credential).unwrap();

        let resolver = CachingResolver::new(Box::new(StaticResolver {
            identity: ResolvedIdentity {
                identifier: advisor.clone(),
                public_key: issuer_signer.public_key.clone(),
                revoked: false,
                resolved_at: 0,
            },
        }));

        let mut op = OperationEnvelope {
            schema: "fee-policy/v1".into(),
            action: "set_anchor".into(),
            params: json!({"channel": "chan-1", "fee_ppm": 150}),
            issuer: advisor,
            nonce: 1,
            ts: "2026-01-01T00:00:00Z".into(),
            credential_ref: cred_hash,
            sig: String::new(),
        };
        sign_op(&mut op, &issuer_signer);

        let engine = build_engine(db, resolver);
        let now = op.timestamp_unix().unwrap();
        let outcome = engine.submit(op, now);
        match outcome {
            covenant_core::SubmitOutcome::Rejected { kind, .. } => assert_eq!(kind, "constraint_violation"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
