//! Commitment openings
//!
//! A `Note` is the secret a holder keeps off-ledger: the amount and the
//! blinding entropy. Revealing it is how a commitment is withdrawn.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use web3::types::U256;

use crate::crypto::{bn254, field_to_hash, CommitmentHasher, CryptoResult};
use crate::utxo::CommitmentHash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub amount: U256,
    pub entropy: U256,
}

impl Note {
    pub fn new(amount: U256, entropy: U256) -> Self {
        Self { amount, entropy }
    }

    /// Note with 248 bits of fresh entropy (always below the field modulus)
    pub fn random(amount: U256) -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes[1..]);
        Self::new(amount, U256::from_big_endian(&bytes))
    }

    /// Commitment hash of this opening, refusing values outside the field
    pub fn commitment(&self, hasher: &dyn CommitmentHasher) -> CryptoResult<CommitmentHash> {
        let amount = bn254::canonical_amount_to_field(&self.amount)?;
        let entropy = bn254::canonical_amount_to_field(&self.entropy)?;
        Ok(field_to_hash(&hasher.hash(&amount, &entropy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PoseidonHasher;

    #[test]
    fn test_random_notes_commit_differently() {
        let hasher = PoseidonHasher::new();
        let a = Note::random(U256::from(10u64));
        let b = Note::random(U256::from(10u64));
        assert_ne!(a.commitment(&hasher).unwrap(), b.commitment(&hasher).unwrap());
    }

    #[test]
    fn test_commitment_is_deterministic() {
        let hasher = PoseidonHasher::new();
        let note = Note::new(U256::from(1u64), U256::from(99u64));
        assert_eq!(note.commitment(&hasher).unwrap(), note.commitment(&hasher).unwrap());
    }

    #[test]
    fn test_out_of_field_entropy_rejected() {
        let hasher = PoseidonHasher::new();
        let note = Note::new(U256::from(1u64), U256::max_value());
        assert!(note.commitment(&hasher).is_err());
    }
}
