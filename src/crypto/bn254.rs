//! BN254 scalar-field conversions
//!
//! Commitment hashes, amounts and fees enter the proof circuits as elements of
//! the BN254 scalar field. Values are read big-endian, the same way the EVM
//! hands a `uint256` to a pairing verifier.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use web3::types::{H256, U256};

use crate::crypto::{CryptoError, CryptoResult};

/// Field element type used for every public input
pub type FieldElement = Fr;

/// Reduce a 32-byte hash into the scalar field
pub fn hash_to_field(hash: &H256) -> Fr {
    Fr::from_be_bytes_mod_order(hash.as_bytes())
}

/// Canonical 32-byte big-endian encoding of a field element
pub fn field_to_hash(element: &Fr) -> H256 {
    let bytes = element.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    H256::from(out)
}

/// Reduce an amount into the scalar field
pub fn amount_to_field(amount: &U256) -> Fr {
    let mut buf = [0u8; 32];
    amount.to_big_endian(&mut buf);
    Fr::from_be_bytes_mod_order(&buf)
}

/// Convert a hash, rejecting values at or above the field modulus.
///
/// Reduction would alias two distinct hashes onto one field element, so any
/// value that does not survive a round trip is refused.
pub fn canonical_hash_to_field(hash: &H256) -> CryptoResult<Fr> {
    let element = hash_to_field(hash);
    if field_to_hash(&element) != *hash {
        return Err(CryptoError::FieldOverflow(format!("{:?}", hash)));
    }
    Ok(element)
}

/// Convert an amount, rejecting values at or above the field modulus
pub fn canonical_amount_to_field(amount: &U256) -> CryptoResult<Fr> {
    let element = amount_to_field(amount);
    let mut buf = [0u8; 32];
    amount.to_big_endian(&mut buf);
    if field_to_hash(&element).as_bytes() != buf {
        return Err(CryptoError::FieldOverflow(amount.to_string()));
    }
    Ok(element)
}
