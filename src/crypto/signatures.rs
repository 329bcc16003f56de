//! Signature Verification Implementation
//!
//! ECDSA (secp256k1) signatures over Ethereum-style prefixed digests. Owners
//! are identified by their 20-byte address, so verification is done by
//! recovering the signer and comparing addresses.

use rand::RngCore;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use web3::types::Address;

use crate::crypto::{CryptoError, CryptoResult, CryptoUtils};

/// r (32) || s (32) || v (1)
pub const SIGNATURE_LENGTH: usize = 65;

/// secp256k1 group order divided by two; larger `s` values are malleable
const HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Derive the Ethereum address of a public key
pub fn address_from_public_key(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = CryptoUtils::keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Recover the address that signed `digest` with the signed-message prefix.
///
/// `digest` is the raw 32-byte payload hash; the prefix is applied here.
/// Accepts `v` as 0/1 or 27/28 and rejects high-`s` signatures.
pub fn recover_signer(digest: &[u8; 32], signature: &[u8]) -> CryptoResult<Address> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(CryptoError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LENGTH,
            signature.len()
        )));
    }

    if signature[32..64] > HALF_ORDER[..] {
        return Err(CryptoError::InvalidSignature("malleable s value".to_string()));
    }

    let v = match signature[64] {
        v @ 0..=1 => v,
        v @ 27..=28 => v - 27,
        other => {
            return Err(CryptoError::InvalidSignature(format!("bad recovery byte {}", other)))
        }
    };

    let recovery_id = RecoveryId::from_i32(v as i32)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let recoverable = RecoverableSignature::from_compact(&signature[..64], recovery_id)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let message_hash = CryptoUtils::eth_signed_message_hash(digest);
    let message = Message::from_digest_slice(&message_hash)
        .map_err(|e| CryptoError::HashError(e.to_string()))?;

    let secp = Secp256k1::verification_only();
    let public_key = secp
        .recover_ecdsa(&message, &recoverable)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;

    Ok(address_from_public_key(&public_key))
}

/// Client-side signer producing witnesses the ledger accepts
#[derive(Debug, Clone)]
pub struct EthSigner {
    secret_key: SecretKey,
    address: Address,
}

impl EthSigner {
    /// Create a signer from a raw 32-byte private key
    pub fn from_bytes(private_key: &[u8; 32]) -> CryptoResult<Self> {
        let secp = Secp256k1::signing_only();
        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        let address = address_from_public_key(&secret_key.public_key(&secp));
        Ok(Self { secret_key, address })
    }

    /// Generate a signer from fresh randomness
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut key_bytes = [0u8; 32];
            rng.fill_bytes(&mut key_bytes);
            // Out-of-range scalars are astronomically rare; draw again
            if let Ok(signer) = Self::from_bytes(&key_bytes) {
                return signer;
            }
        }
    }

    /// Address that owns commitments signed by this key
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte payload digest with the signed-message prefix
    pub fn sign_digest(&self, digest: &[u8; 32]) -> CryptoResult<Vec<u8>> {
        let secp = Secp256k1::signing_only();
        let message_hash = CryptoUtils::eth_signed_message_hash(digest);
        let message = Message::from_digest_slice(&message_hash)
            .map_err(|e| CryptoError::HashError(e.to_string()))?;

        let (recovery_id, compact) = secp
            .sign_ecdsa_recoverable(&message, &self.secret_key)
            .serialize_compact();

        let mut signature = Vec::with_capacity(SIGNATURE_LENGTH);
        signature.extend_from_slice(&compact);
        signature.push(27 + recovery_id.to_i32() as u8);
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_recover() {
        let signer = EthSigner::random();
        let digest = CryptoUtils::keccak256(b"transaction payload");

        let signature = signer.sign_digest(&digest).unwrap();
        assert_eq!(signature.len(), SIGNATURE_LENGTH);
        assert_eq!(recover_signer(&digest, &signature).unwrap(), signer.address());
    }

    #[test]
    fn test_recover_accepts_raw_recovery_byte() {
        let signer = EthSigner::random();
        let digest = CryptoUtils::keccak256(b"raw v");

        let mut signature = signer.sign_digest(&digest).unwrap();
        signature[64] -= 27;
        assert_eq!(recover_signer(&digest, &signature).unwrap(), signer.address());
    }

    #[test]
    fn test_wrong_digest_recovers_other_address() {
        let signer = EthSigner::random();
        let signature = signer.sign_digest(&CryptoUtils::keccak256(b"one")).unwrap();

        let recovered = recover_signer(&CryptoUtils::keccak256(b"two"), &signature);
        assert!(recovered.map(|a| a != signer.address()).unwrap_or(true));
    }

    #[test]
    fn test_known_address_derivation() {
        // Private key 1 maps to the well-known address 0x7e5f...bdf
        let mut key = [0u8; 32];
        key[31] = 1;
        let signer = EthSigner::from_bytes(&key).unwrap();
        assert_eq!(
            CryptoUtils::to_hex(signer.address().as_bytes()),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_malformed_signatures_rejected() {
        let digest = CryptoUtils::keccak256(b"x");
        assert!(recover_signer(&digest, &[0u8; 64]).is_err());

        let signer = EthSigner::random();
        let mut signature = signer.sign_digest(&digest).unwrap();
        signature[64] = 5;
        assert!(recover_signer(&digest, &signature).is_err());

        let mut high_s = signer.sign_digest(&digest).unwrap();
        high_s[32..64].copy_from_slice(&[0xff; 32]);
        assert!(matches!(
            recover_signer(&digest, &high_s),
            Err(CryptoError::InvalidSignature(_))
        ));
    }
}
