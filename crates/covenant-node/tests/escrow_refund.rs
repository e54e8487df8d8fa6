//! E6 — an escrow ticket past its timelock reclaims cleanly and can no
//! longer be redeemed by the payee.

use std::sync::Mutex as StdMutex;

use covenant_core::{Amount, CovenantError, EscrowState, EscrowVariant, Identifier, PublicKey, SpendingCondition};
use covenant_escrow::{EscrowManager, Mint, TokenState};

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
fn reclaim_after_timelock_blocks_subsequent_redeem() {
    let mint = Box::new(FakeMint { minted: StdMutex::new(Vec::new()) });
    let escrow = EscrowManager::new(mint, None, None).unwrap();

    let payer = Identifier::new("payer");
    let payee = Identifier::new("payee");
    let locktime: i64 = 1_000;
    let ticket = escrow
        .issue(
            "ticket-e6".into(),
            payer,
            payee,
            PublicKey(vec![1]),
            PublicKey(vec![2]),
            5_000,
            locktime,
            EscrowVariant::Simple,
            0,
            None,
        )
        .unwrap();
    assert_eq!(ticket.amount, 5_000);

    let now = locktime + 1;
    escrow.reclaim(&ticket.ticket_id, now).unwrap();

    let reclaimed = escrow.ticket(&ticket.ticket_id).unwrap();
    assert_eq!(reclaimed.state, EscrowState::Refunded);
    assert_eq!(reclaimed.refunded_at, Some(now));

    let secret = covenant_core::Secret { ticket_id: ticket.ticket_id.clone(), preimage: vec![0u8; 32] };
    let bogus_sig = covenant_core::Signature(vec![0u8; 64]);
    let err = escrow.redeem(&ticket.ticket_id, &secret, &bogus_sig, now).unwrap_err();
    assert!(matches!(err, CovenantError::EscrowExpired));
}

#[test]
fn ticket_one_second_before_locktime_still_redeemable() {
    let mint = Box::new(FakeMint { minted: StdMutex::new(Vec::new()) });
    let escrow = EscrowManager::new(mint, None, None).unwrap();
    let locktime: i64 = 1_000;
    let ticket = escrow
        .issue(
            "ticket-e6b".into(),
            Identifier::new("payer"),
            Identifier::new("payee"),
            PublicKey(vec![1]),
            PublicKey(vec![2]),
            5_000,
            locktime,
            EscrowVariant::Simple,
            0,
            None,
        )
        .unwrap();
    assert!(ticket.redeemable_at(locktime - 1));
    assert!(!ticket.redeemable_at(locktime));
    assert!(!ticket.reclaimable_at(locktime - 1));
    assert!(ticket.reclaimable_at(locktime));
}
