//! Atomic Batch Writer Implementation
//!
//! Ledger operations stage every commitment mutation in a `CommitmentBatch`
//! and hand it to the store in one call. Operations are applied in insertion
//! order: deletions of consumed inputs come before creations of outputs.

use std::collections::HashMap;

use crate::database::{StoreError, StoreResult};
use crate::utxo::{AssetId, Commitment, CommitmentHash, Owner};

/// Batch operation types for atomic state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Insert a new active commitment
    Create {
        asset: AssetId,
        hash: CommitmentHash,
        owner: Owner,
    },

    /// Clear an active commitment; `prior_owner` allows the batch to be inverted
    Remove {
        asset: AssetId,
        hash: CommitmentHash,
        prior_owner: Owner,
    },
}

/// Final value of one key after planning; `None` deletes the record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub asset: AssetId,
    pub hash: CommitmentHash,
    pub value: Option<Commitment>,
}

/// Ordered set of commitment mutations applied all-or-nothing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitmentBatch {
    operations: Vec<BatchOperation>,
}

impl CommitmentBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, asset: AssetId, hash: CommitmentHash, owner: Owner) {
        self.operations.push(BatchOperation::Create { asset, hash, owner });
    }

    pub fn remove(&mut self, asset: AssetId, hash: CommitmentHash, prior_owner: Owner) {
        self.operations.push(BatchOperation::Remove {
            asset,
            hash,
            prior_owner,
        });
    }

    pub fn operations(&self) -> &[BatchOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Batch that undoes this one when applied after it
    pub fn inverse(&self) -> Self {
        let operations = self
            .operations
            .iter()
            .rev()
            .map(|op| match *op {
                BatchOperation::Create { asset, hash, owner } => BatchOperation::Remove {
                    asset,
                    hash,
                    prior_owner: owner,
                },
                BatchOperation::Remove {
                    asset,
                    hash,
                    prior_owner,
                } => BatchOperation::Create {
                    asset,
                    hash,
                    owner: prior_owner,
                },
            })
            .collect();
        Self { operations }
    }

    /// Replay the batch against `lookup` and return the resulting writes.
    ///
    /// Fails without side effects if a creation hits an active commitment or
    /// a removal hits an empty one, taking earlier operations of the same
    /// batch into account.
    pub fn plan<F>(&self, mut lookup: F) -> StoreResult<Vec<PlannedWrite>>
    where
        F: FnMut(&AssetId, &CommitmentHash) -> StoreResult<Commitment>,
    {
        let mut overlay: HashMap<(AssetId, CommitmentHash), Commitment> = HashMap::new();
        let mut order: Vec<(AssetId, CommitmentHash)> = Vec::new();

        for op in &self.operations {
            let (asset, hash) = match op {
                BatchOperation::Create { asset, hash, .. } => (*asset, *hash),
                BatchOperation::Remove { asset, hash, .. } => (*asset, *hash),
            };

            let current = match overlay.get(&(asset, hash)) {
                Some(staged) => *staged,
                None => {
                    order.push((asset, hash));
                    lookup(&asset, &hash)?
                }
            };

            let next = match op {
                BatchOperation::Create { owner, .. } => {
                    if current.is_active() {
                        return Err(StoreError::Occupied { asset, hash });
                    }
                    Commitment::active(*owner)
                }
                BatchOperation::Remove { .. } => {
                    if !current.is_active() {
                        return Err(StoreError::Missing { asset, hash });
                    }
                    Commitment::default()
                }
            };
            overlay.insert((asset, hash), next);
        }

        Ok(order
            .into_iter()
            .map(|(asset, hash)| {
                let value = overlay
                    .get(&(asset, hash))
                    .copied()
                    .filter(Commitment::is_active);
                PlannedWrite { asset, hash, value }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use web3::types::{Address, H256};

    fn empty_lookup(_: &AssetId, _: &CommitmentHash) -> StoreResult<Commitment> {
        Ok(Commitment::default())
    }

    #[test]
    fn test_inverse_reverses_and_swaps() {
        let asset = Address::from_low_u64_be(1);
        let owner = Address::from_low_u64_be(2);
        let mut batch = CommitmentBatch::new();
        batch.remove(asset, H256::from_low_u64_be(1), owner);
        batch.create(asset, H256::from_low_u64_be(2), owner);

        let inverse = batch.inverse();
        assert_eq!(
            inverse.operations(),
            &[
                BatchOperation::Remove {
                    asset,
                    hash: H256::from_low_u64_be(2),
                    prior_owner: owner
                },
                BatchOperation::Create {
                    asset,
                    hash: H256::from_low_u64_be(1),
                    owner
                },
            ]
        );
        assert_eq!(inverse.inverse(), batch);
    }

    #[test]
    fn test_plan_rejects_double_create() {
        let asset = Address::from_low_u64_be(1);
        let hash = H256::from_low_u64_be(5);
        let mut batch = CommitmentBatch::new();
        batch.create(asset, hash, Address::from_low_u64_be(2));
        batch.create(asset, hash, Address::from_low_u64_be(3));

        assert!(matches!(
            batch.plan(empty_lookup),
            Err(StoreError::Occupied { .. })
        ));
    }

    #[test]
    fn test_plan_remove_then_recreate() {
        let asset = Address::from_low_u64_be(1);
        let hash = H256::from_low_u64_be(5);
        let old_owner = Address::from_low_u64_be(2);
        let new_owner = Address::from_low_u64_be(3);

        let mut batch = CommitmentBatch::new();
        batch.remove(asset, hash, old_owner);
        batch.create(asset, hash, new_owner);

        let writes = batch
            .plan(|_, _| Ok(Commitment::active(old_owner)))
            .unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].value, Some(Commitment::active(new_owner)));
    }

    #[test]
    fn test_plan_rejects_missing_remove() {
        let mut batch = CommitmentBatch::new();
        batch.remove(Address::from_low_u64_be(1), H256::from_low_u64_be(5), Address::zero());
        assert!(matches!(
            batch.plan(empty_lookup),
            Err(StoreError::Missing { .. })
        ));
    }
}
