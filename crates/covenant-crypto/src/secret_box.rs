//! Encrypts `covenant_core::Secret` preimages at rest, with a key held
//! in-process only.

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum SealError {
    #[error("encryption failed")]
    Encrypt,
    #[error("decryption failed (wrong key or corrupted ciphertext)")]
    Decrypt,
}

/// An in-process-only key for sealing secrets. Never persisted.
pub struct SecretBoxKey(Zeroizing<[u8; 32]>);

impl SecretBoxKey {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        use rand::RngCore;
        rand::thread_rng().fill_bytes(&mut bytes);
        SecretBoxKey(Zeroizing::new(bytes))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        SecretBoxKey(Zeroizing::new(bytes))
    }
}

/// Nonce-prefixed ciphertext: `[12-byte nonce][ciphertext]`.
pub fn seal(key: &SecretBoxKey, plaintext: &[u8]) -> Result<Vec<u8>, SealError> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key.0));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
    let ciphertext = cipher.encrypt(&nonce, plaintext).map_err(|_| SealError::Encrypt)?;
    let mut out = nonce.to_vec();
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

pub fn open(key: &SecretBoxKey, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, SealError> {
    if sealed.len() < 12 {
        return Err(SealError::Decrypt);
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(12);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key.0));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| SealError::Decrypt)?;
    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trip() {
        let key = SecretBoxKey::generate();
        let sealed = seal(&key, b"preimage-bytes").unwrap();
        let opened = open(&key, &sealed).unwrap();
        assert_eq!(&*opened, b"preimage-bytes");
    }

    #[test]
    fn wrong_key_fails() {
        let key = SecretBoxKey::generate();
        let other = SecretBoxKey::generate();
        let sealed = seal(&key, b"preimage-bytes").unwrap();
        assert!(open(&other, &sealed).is_err());
    }
}
