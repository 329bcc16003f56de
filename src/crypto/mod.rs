//! Cryptographic Primitives Module
//!
//! Primitives the ledger needs around its external collaborators:
//! - ECDSA (secp256k1) recovery over Ethereum-style prefixed digests
//! - BN254 scalar-field conversions for proof public inputs
//! - A Poseidon-class commitment hasher

use sha3::Digest;

pub mod bn254;
pub mod poseidon;
pub mod signatures;

// Re-export main types
pub use bn254::{amount_to_field, field_to_hash, hash_to_field, FieldElement};
pub use poseidon::{CommitmentHasher, PoseidonHasher};
pub use signatures::{recover_signer, EthSigner, SIGNATURE_LENGTH};

/// Cryptographic error types
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Hash function error: {0}")]
    HashError(String),

    #[error("Value does not fit the scalar field: {0}")]
    FieldOverflow(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Domain constants for cryptographic operations
pub mod domains {
    /// Seed for the Poseidon round constants
    pub const DOMAIN_POSEIDON: &[u8] = b"privacy-pool-poseidon";

    /// Prefix applied to 32-byte digests before ECDSA signing
    pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";
}

/// Cryptographic utilities
pub struct CryptoUtils;

impl CryptoUtils {
    /// Hash data with Keccak-256
    pub fn keccak256(data: &[u8]) -> [u8; 32] {
        sha3::Keccak256::digest(data).into()
    }

    /// Hash data with BLAKE2s-256
    pub fn blake2s256(data: &[u8]) -> [u8; 32] {
        blake2::Blake2s256::digest(data).into()
    }

    /// Wrap a 32-byte digest in the signed-message prefix and hash it again
    pub fn eth_signed_message_hash(digest: &[u8; 32]) -> [u8; 32] {
        let mut hasher = sha3::Keccak256::new();
        hasher.update(domains::ETH_SIGNED_MESSAGE_PREFIX);
        hasher.update(digest);
        hasher.finalize().into()
    }

    /// Convert bytes to hex string
    pub fn to_hex(bytes: &[u8]) -> String {
        hex::encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_known_vector() {
        // keccak256("") as used by the EVM
        assert_eq!(
            CryptoUtils::to_hex(&CryptoUtils::keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_signed_message_hash_differs_from_digest() {
        let digest = CryptoUtils::keccak256(b"payload");
        let prefixed = CryptoUtils::eth_signed_message_hash(&digest);
        assert_ne!(digest, prefixed);
        assert_eq!(prefixed, CryptoUtils::eth_signed_message_hash(&digest));
    }
}
