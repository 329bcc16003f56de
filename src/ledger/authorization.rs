//! Spend authorization
//!
//! One signature per witness group rather than per input. The group's owner
//! is the current owner of its first listed input; every other input in the
//! group must share that owner, and the signature must recover to it.

use crate::crypto::recover_signer;
use crate::database::CommitmentStore;
use crate::error::{LedgerError, LedgerResult};
use crate::utxo::{Commitment, InputWitness, Owner, Transaction};

/// Resolved state of one authorized input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizedInput {
    pub index: usize,
    pub owner: Owner,
}

/// Authorize every input witness group of `tx`.
///
/// Assumes the input partition was already validated. Returns the owner of
/// each input in `input_hashes` order.
pub fn authorize_inputs(store: &dyn CommitmentStore, tx: &Transaction) -> LedgerResult<Vec<Owner>> {
    let digest = tx.signing_digest();
    let mut owners = vec![Owner::zero(); tx.input_hashes.len()];

    for witness in &tx.input_witnesses {
        for input in authorize_group(store, tx, witness, &digest)? {
            owners[input.index] = input.owner;
        }
    }
    Ok(owners)
}

fn authorize_group(
    store: &dyn CommitmentStore,
    tx: &Transaction,
    witness: &InputWitness,
    digest: &[u8; 32],
) -> LedgerResult<Vec<AuthorizedInput>> {
    let (&first, rest) = witness
        .indices
        .split_first()
        .ok_or(LedgerError::EmptyWitnessGroup)?;

    let first_hash = tx.input_hashes[first];
    let head: Commitment = store.get(&tx.asset, &first_hash)?;
    if !head.is_active() {
        return Err(LedgerError::InputCommitmentNotFound(first_hash));
    }
    let owner = head.owner;
    let mut authorized = vec![AuthorizedInput { index: first, owner }];

    // A missing follower has the empty owner and fails as a mixed group
    for &index in rest {
        let found = store.get(&tx.asset, &tx.input_hashes[index])?.owner;
        if found != owner {
            return Err(LedgerError::MixedOwnerWitness {
                hash: tx.input_hashes[index],
                expected: owner,
                found,
            });
        }
        authorized.push(AuthorizedInput { index, owner });
    }

    match recover_signer(digest, &witness.signature) {
        Ok(signer) if signer == owner => Ok(authorized),
        Ok(signer) => {
            log::debug!("Witness signed by {:?}, inputs owned by {:?}", signer, owner);
            Err(LedgerError::InvalidSignature { owner })
        }
        Err(e) => {
            log::debug!("Unrecoverable witness signature: {}", e);
            Err(LedgerError::InvalidSignature { owner })
        }
    }
}
