//! Secret vault enforcing the invariant that a secret is released at most
//! once. The Escrow Manager exclusively owns `Secret`s.

use covenant_core::constants::SECRET_ZEROIZE_AFTER_REFUND_DAYS;
use covenant_core::{CovenantError, HashLock, Secret, Timestamp};
use covenant_crypto::secret_box::{self, SecretBoxKey};
use std::collections::HashMap;
use std::sync::RwLock;

struct SealedSecret {
    sealed: Vec<u8>,
    revealed: bool,
    purge_at: Option<Timestamp>,
}

/// Holds sealed secret preimages keyed by ticket id. The unsealing key lives
/// in-process only and is never persisted.
pub struct SecretVault {
    key: SecretBoxKey,
    secrets: RwLock<HashMap<String, SealedSecret>>,
}

impl SecretVault {
    pub fn new() -> Self {
        Self { key: SecretBoxKey::generate(), secrets: RwLock::new(HashMap::new()) }
    }

    pub fn store(&self, ticket_id: &str, preimage: &[u8]) -> Result<(), CovenantError> {
        let sealed = secret_box::seal(&self.key, preimage)
            .map_err(|e| CovenantError::Other(format!("secret seal failed: {e}")))?;
        self.secrets
            .write()
            .unwrap()
            .insert(ticket_id.to_string(), SealedSecret { sealed, revealed: false, purge_at: None });
        Ok(())
    }

    /// Reveals the secret for `ticket_id`. Idempotent: repeated calls after
    /// the first reveal return the same preimage without re-deriving it.
    pub fn reveal(&self, ticket_id: &str) -> Result<Secret, CovenantError> {
        let mut secrets = self.secrets.write().unwrap();
        let entry = secrets
            .get_mut(ticket_id)
            .ok_or_else(|| CovenantError::NotFound(format!("no secret for ticket {ticket_id}")))?;
        let preimage = secret_box::open(&self.key, &entry.sealed)
            .map_err(|e| CovenantError::Other(format!("secret unseal failed: {e}")))?;
        entry.revealed = true;
        Ok(Secret { ticket_id: ticket_id.to_string(), preimage: preimage.to_vec() })
    }

    pub fn is_revealed(&self, ticket_id: &str) -> bool {
        self.secrets.read().unwrap().get(ticket_id).map(|e| e.revealed).unwrap_or(false)
    }

    pub fn hash_lock(&self, ticket_id: &str) -> Result<HashLock, CovenantError> {
        let secret = self.reveal(ticket_id)?;
        Ok(secret.hash_lock())
    }

    /// Schedules `ticket_id`'s secret for zeroization after a refund.
    pub fn schedule_purge(&self, ticket_id: &str, refunded_at: Timestamp) {
        if let Some(entry) = self.secrets.write().unwrap().get_mut(ticket_id) {
            entry.purge_at = Some(refunded_at + SECRET_ZEROIZE_AFTER_REFUND_DAYS * 86_400);
        }
    }

    pub fn purge_due(&self, now: Timestamp) -> Vec<String> {
        let mut secrets = self.secrets.write().unwrap();
        let due: Vec<String> = secrets
            .iter()
            .filter(|(_, e)| e.purge_at.map(|t| now >= t).unwrap_or(false))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &due {
            secrets.remove(id);
        }
        due
    }
}

impl Default for SecretVault {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_is_idempotent_and_hash_matches() {
        let vault = SecretVault::new();
        vault.store("t1", b"preimage").unwrap();
        let s1 = vault.reveal("t1").unwrap();
        let s2 = vault.reveal("t1").unwrap();
        assert_eq!(s1.preimage, s2.preimage);
        assert!(vault.is_revealed("t1"));
    }

    #[test]
    fn purge_removes_secret_after_schedule() {
        let vault = SecretVault::new();
        vault.store("t1", b"preimage").unwrap();
        vault.schedule_purge("t1", 0);
        let due = vault.purge_due(SECRET_ZEROIZE_AFTER_REFUND_DAYS * 86_400);
        assert_eq!(due, vec!["t1".to_string()]);
        assert!(vault.reveal("t1").is_err());
    }
}
