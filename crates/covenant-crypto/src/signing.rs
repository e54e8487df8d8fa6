use covenant_core::{PublicKey, Signature};
use pqcrypto_dilithium::dilithium2;
use pqcrypto_traits::sign::{DetachedSignature, PublicKey as _, SecretKey as _};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid public key length: expected {expected}, got {got}")]
    InvalidPublicKeyLength { expected: usize, got: usize },
}

/// Sign `message` with a Dilithium2 secret key, returning a detached
/// signature. Used for issuer/node signatures over canonical operation,
/// receipt and credential encodings.
pub fn sign(secret_key_bytes: &[u8], message: &[u8]) -> Result<Signature, SignatureError> {
    let sk = dilithium2::SecretKey::from_bytes(secret_key_bytes)
        .map_err(|_| SignatureError::InvalidSignature)?;
    let sig = dilithium2::detached_sign(message, &sk);
    Ok(Signature(sig.as_bytes().to_vec()))
}

/// Verify a detached Dilithium2 signature.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> Result<(), SignatureError> {
    let pk = dilithium2::PublicKey::from_bytes(&public_key.0).map_err(|_| {
        SignatureError::InvalidPublicKeyLength {
            expected: dilithium2::public_key_bytes(),
            got: public_key.0.len(),
        }
    })?;
    let sig = dilithium2::DetachedSignature::from_bytes(&signature.0)
        .map_err(|_| SignatureError::InvalidSignature)?;
    dilithium2::verify_detached_signature(&sig, message, &pk).map_err(|_| SignatureError::InvalidSignature)
}

/// A keypair wrapper that zeroizes its secret key on drop — used by
/// `covenant-node` (node-side receipt signing) and `covenant-cli` (issuer
/// signing of operation envelopes and credentials).
pub struct Signer {
    pub public_key: PublicKey,
    secret_key_bytes: zeroize::Zeroizing<Vec<u8>>,
}

impl Signer {
    pub fn generate() -> Self {
        let (pk, sk) = dilithium2::keypair();
        Self {
            public_key: PublicKey(pk.as_bytes().to_vec()),
            secret_key_bytes: zeroize::Zeroizing::new(sk.as_bytes().to_vec()),
        }
    }

    pub fn from_secret_key_bytes(sk_bytes: Vec<u8>, pk_bytes: Vec<u8>) -> Self {
        Self {
            public_key: PublicKey(pk_bytes),
            secret_key_bytes: zeroize::Zeroizing::new(sk_bytes),
        }
    }

    pub fn sign(&self, message: &[u8]) -> Result<Signature, SignatureError> {
        sign(&self.secret_key_bytes, message)
    }

    pub fn verify(&self, message: &[u8], sig: &Signature) -> Result<(), SignatureError> {
        verify(&self.public_key, message, sig)
    }

    pub fn secret_key_bytes(&self) -> &[u8] {
        &self.secret_key_bytes
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signer(public_key={:?})", self.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let signer = Signer::generate();
        let message = b"covenant operation envelope";
        let sig = signer.sign(message).unwrap();
        assert!(signer.verify(message, &sig).is_ok());
    }

    #[test]
    fn tampered_message_fails() {
        let signer = Signer::generate();
        let sig = signer.sign(b"original").unwrap();
        assert!(signer.verify(b"tampered", &sig).is_err());
    }
}
