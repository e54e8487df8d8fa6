//! Persistence layer: `sled` embedded KV store, one named tree per entity
//! kind, `get_X`/`put_X`/`iter_X` per tree. Each tree is an append-only
//! log plus index; recovery replays the log to rebuild indexes.

use covenant_core::{
    ContentHash, CovenantError, Identifier, ManagementCredential, Nonce, Receipt, Seq,
};
use std::path::Path;

pub struct CovenantDb {
    db: sled::Db,
    nonces: sled::Tree,
    credentials: sled::Tree,
    revocations: sled::Tree,
    receipts: sled::Tree,
    meta: sled::Tree,
}

fn ser<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, CovenantError> {
    bincode::serialize(value).map_err(|e| CovenantError::Serialization(e.to_string()))
}

fn de<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, CovenantError> {
    bincode::deserialize(bytes).map_err(|e| CovenantError::Serialization(e.to_string()))
}

impl CovenantDb {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CovenantError> {
        let db = sled::open(path).map_err(|e| CovenantError::Storage(e.to_string()))?;
        Ok(Self {
            nonces: db.open_tree("nonces").map_err(|e| CovenantError::Storage(e.to_string()))?,
            credentials: db
                .open_tree("credentials")
                .map_err(|e| CovenantError::Storage(e.to_string()))?,
            revocations: db
                .open_tree("revocations")
                .map_err(|e| CovenantError::Storage(e.to_string()))?,
            receipts: db.open_tree("receipts").map_err(|e| CovenantError::Storage(e.to_string()))?,
            meta: db.open_tree("meta").map_err(|e| CovenantError::Storage(e.to_string()))?,
            db,
        })
    }

    pub fn flush(&self) -> Result<(), CovenantError> {
        self.db.flush().map_err(|e| CovenantError::Storage(e.to_string()))?;
        Ok(())
    }

    // ── Replay / Nonce Guard (C3) ────────────────────────────────────────────

    pub fn last_nonce(&self, issuer: &Identifier) -> Result<Option<Nonce>, CovenantError> {
        match self.nonces.get(issuer.0.as_bytes()).map_err(|e| CovenantError::Storage(e.to_string()))? {
            Some(bytes) => Ok(Some(de(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_last_nonce(&self, issuer: &Identifier, nonce: Nonce) -> Result<(), CovenantError> {
        self.nonces
            .insert(issuer.0.as_bytes(), ser(&nonce)?)
            .map_err(|e| CovenantError::Storage(e.to_string()))?;
        Ok(())
    }

    // ── Credential Store (C2) ─────────────────────────────────────────────────

    pub fn put_credential(&self, hash: &ContentHash, cred: &ManagementCredential) -> Result<(), CovenantError> {
        self.credentials
            .insert(hash.0, ser(cred)?)
            .map_err(|e| CovenantError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_credential(&self, hash: &ContentHash) -> Result<Option<ManagementCredential>, CovenantError> {
        match self.credentials.get(hash.0).map_err(|e| CovenantError::Storage(e.to_string()))? {
            Some(bytes) => Ok(Some(de(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn revoke_credential(&self, hash: &ContentHash) -> Result<(), CovenantError> {
        self.revocations
            .insert(hash.0, &[1u8])
            .map_err(|e| CovenantError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn is_revoked(&self, hash: &ContentHash) -> Result<bool, CovenantError> {
        Ok(self
            .revocations
            .contains_key(hash.0)
            .map_err(|e| CovenantError::Storage(e.to_string()))?)
    }

    // ── Receipt Ledger (C6) ───────────────────────────────────────────────────

    pub fn latest_seq(&self) -> Result<Seq, CovenantError> {
        match self.meta.get(b"latest_seq").map_err(|e| CovenantError::Storage(e.to_string()))? {
            Some(bytes) => de(&bytes),
            None => Ok(0),
        }
    }

    /// Appends a receipt. The caller is responsible for having checked
    /// `receipt.seq == latest_seq() + 1` and `receipt.prev` linkage before
    /// calling this — this method performs the atomic persist only.
    pub fn put_receipt(&self, receipt: &Receipt) -> Result<(), CovenantError> {
        self.receipts
            .insert(receipt.seq.to_be_bytes(), ser(receipt)?)
            .map_err(|e| CovenantError::Storage(e.to_string()))?;
        self.meta
            .insert(b"latest_seq", ser(&receipt.seq)?)
            .map_err(|e| CovenantError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_receipt(&self, seq: Seq) -> Result<Option<Receipt>, CovenantError> {
        match self
            .receipts
            .get(seq.to_be_bytes())
            .map_err(|e| CovenantError::Storage(e.to_string()))?
        {
            Some(bytes) => Ok(Some(de(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn range_receipts(&self, lo: Seq, hi: Seq) -> Result<Vec<Receipt>, CovenantError> {
        let mut out = Vec::new();
        for kv in self.receipts.range(lo.to_be_bytes()..=hi.to_be_bytes()) {
            let (_, v) = kv.map_err(|e| CovenantError::Storage(e.to_string()))?;
            out.push(de(&v)?);
        }
        Ok(out)
    }

    /// Rebuilds the nonce-table index by replaying the receipt ledger.
    pub fn rebuild_nonce_index(&self) -> Result<(), CovenantError> {
        self.nonces.clear().map_err(|e| CovenantError::Storage(e.to_string()))?;
        for kv in self.receipts.iter() {
            let (_, v) = kv.map_err(|e| CovenantError::Storage(e.to_string()))?;
            let receipt: Receipt = de(&v)?;
            if receipt.is_success() {
                let current = self.last_nonce(&receipt.op.issuer)?.unwrap_or(0);
                if receipt.op.nonce > current {
                    self.set_last_nonce(&receipt.op.issuer, receipt.op.nonce)?;
                }
            }
        }
        Ok(())
    }
}
