pub mod hash;
pub mod pow;
pub mod secret_box;
pub mod signing;

pub use hash::{blake3_hash, content_hash, hash_concat};
pub use pow::{mine_pow, verify_pow};
pub use secret_box::{open, seal, SealError, SecretBoxKey};
pub use signing::{sign, verify, SignatureError, Signer};
