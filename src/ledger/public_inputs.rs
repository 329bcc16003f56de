//! Public-input assembly
//!
//! Layouts must match the circuits exactly. A mismatch is indistinguishable
//! from a bad proof.

use web3::types::U256;

use crate::crypto::{bn254, FieldElement};
use crate::error::LedgerResult;
use crate::utxo::{CommitmentHash, DepositSlot};

/// `[slot hashes..., total]`
pub fn deposit_inputs(slots: &[DepositSlot], total: &U256) -> LedgerResult<Vec<FieldElement>> {
    let mut inputs = Vec::with_capacity(slots.len() + 1);
    for slot in slots {
        inputs.push(bn254::canonical_hash_to_field(&slot.hash)?);
    }
    inputs.push(bn254::canonical_amount_to_field(total)?);
    Ok(inputs)
}

/// `[input hashes..., output hashes..., fee]`
pub fn spend_inputs(
    input_hashes: &[CommitmentHash],
    output_hashes: &[CommitmentHash],
    fee: &U256,
) -> LedgerResult<Vec<FieldElement>> {
    let mut inputs = Vec::with_capacity(input_hashes.len() + output_hashes.len() + 1);
    for hash in input_hashes.iter().chain(output_hashes) {
        inputs.push(bn254::canonical_hash_to_field(hash)?);
    }
    inputs.push(bn254::canonical_amount_to_field(fee)?);
    Ok(inputs)
}
