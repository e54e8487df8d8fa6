//! Marketplace event spam resistance: events not meeting the configured
//! proof-of-work bit count are dropped at ingress. This is a per-event
//! anti-spam stamp, not block-mining proof-of-work — there is no
//! blockchain in this system.

use sha3::{Digest, Sha3_256};

/// Verify that `sha3_256(event_bytes || nonce)` has at least `difficulty`
/// leading zero bits.
pub fn verify_pow(event_bytes: &[u8], nonce: u64, difficulty: u8) -> bool {
    leading_zero_bits(&pow_hash(event_bytes, nonce)) >= difficulty
}

/// Finds a nonce satisfying `verify_pow` for `event_bytes` at `difficulty`.
/// Used by event publishers (`covenant-marketplace`) before broadcast.
pub fn mine_pow(event_bytes: &[u8], difficulty: u8) -> u64 {
    for nonce in 0u64.. {
        if verify_pow(event_bytes, nonce, difficulty) {
            return nonce;
        }
    }
    unreachable!("PoW loop exhausted u64 range")
}

fn pow_hash(event_bytes: &[u8], nonce: u64) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(event_bytes);
    hasher.update(nonce.to_le_bytes());
    hasher.finalize().into()
}

fn leading_zero_bits(hash: &[u8; 32]) -> u8 {
    let mut count = 0u8;
    for byte in hash {
        let lz = byte.leading_zeros() as u8;
        count += lz;
        if lz < 8 {
            break;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow_round_trip() {
        let event = b"marketplace event bytes";
        let difficulty = 8;
        let nonce = mine_pow(event, difficulty);
        assert!(verify_pow(event, nonce, difficulty));
    }

    #[test]
    fn leading_zeros_correct() {
        let mut hash = [0u8; 32];
        hash[0] = 0b0000_1111;
        assert_eq!(leading_zero_bits(&hash), 4);
    }
}
