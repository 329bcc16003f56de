//! Commitment records
//!
//! A commitment is identified by `(asset, hash)` where `hash = H(amount, entropy)`.
//! Only the owner and the advisory `spent` flag are ever stored.

use serde::{Deserialize, Serialize};
use web3::types::{Address, H256};

/// Token pool identifier (ERC20-style contract address)
pub type AssetId = Address;

/// Principal allowed to spend or withdraw a commitment
pub type Owner = Address;

/// Hash of a commitment opening
pub type CommitmentHash = H256;

/// Stored state of one commitment.
///
/// A zero owner means the slot is empty. Removal writes the empty state, so a
/// consumed commitment is indistinguishable from one that never existed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub owner: Owner,
    pub spent: bool,
}

impl Commitment {
    /// Active commitment held by `owner`
    pub fn active(owner: Owner) -> Self {
        Self { owner, spent: false }
    }

    /// Whether the slot currently holds a commitment
    pub fn is_active(&self) -> bool {
        !self.owner.is_zero()
    }

    /// Fixed-width storage encoding: owner (20) || spent (1)
    pub fn to_bytes(&self) -> [u8; 21] {
        let mut bytes = [0u8; 21];
        bytes[..20].copy_from_slice(self.owner.as_bytes());
        bytes[20] = self.spent as u8;
        bytes
    }

    /// Decode the storage encoding; `None` on a length mismatch
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 21 {
            return None;
        }
        Some(Self {
            owner: Address::from_slice(&bytes[..20]),
            spent: bytes[20] != 0,
        })
    }
}

/// One output of a deposit: the commitment hash and who may spend it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSlot {
    pub hash: CommitmentHash,
    pub owner: Owner,
}

impl DepositSlot {
    pub fn new(hash: CommitmentHash, owner: Owner) -> Self {
        Self { hash, owner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_commitment_is_inactive() {
        assert!(!Commitment::default().is_active());
        assert!(Commitment::active(Address::from_low_u64_be(7)).is_active());
    }

    #[test]
    fn test_storage_encoding() {
        let commitment = Commitment::active(Address::from_low_u64_be(0xabcd));
        let bytes = commitment.to_bytes();
        assert_eq!(bytes[20], 0);
        assert_eq!(Commitment::from_bytes(&bytes), Some(commitment));
        assert_eq!(Commitment::from_bytes(&bytes[..20]), None);
    }
}
