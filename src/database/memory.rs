//! In-memory commitment store for tests and ephemeral ledgers

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::database::{CommitmentBatch, CommitmentStore, StoreResult};
use crate::utxo::{AssetId, Commitment, CommitmentHash};

#[derive(Debug, Default)]
pub struct InMemoryCommitmentStore {
    commitments: RwLock<HashMap<(AssetId, CommitmentHash), Commitment>>,
}

impl InMemoryCommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active commitments across all assets
    pub fn len(&self) -> usize {
        self.commitments.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commitments.read().is_empty()
    }
}

impl CommitmentStore for InMemoryCommitmentStore {
    fn get(&self, asset: &AssetId, hash: &CommitmentHash) -> StoreResult<Commitment> {
        Ok(self
            .commitments
            .read()
            .get(&(*asset, *hash))
            .copied()
            .unwrap_or_default())
    }

    fn write_batch(&self, batch: &CommitmentBatch) -> StoreResult<()> {
        let mut commitments = self.commitments.write();
        let writes = batch.plan(|asset, hash| {
            Ok(commitments.get(&(*asset, *hash)).copied().unwrap_or_default())
        })?;

        for write in writes {
            match write.value {
                Some(commitment) => {
                    commitments.insert((write.asset, write.hash), commitment);
                }
                None => {
                    commitments.remove(&(write.asset, write.hash));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;
    use web3::types::{Address, H256};

    #[test]
    fn test_assets_are_separate_namespaces() {
        let store = InMemoryCommitmentStore::new();
        let hash = H256::from_low_u64_be(1);
        let owner = Address::from_low_u64_be(5);

        store.put(&Address::from_low_u64_be(1), &hash, owner).unwrap();
        assert!(store.get(&Address::from_low_u64_be(1), &hash).unwrap().is_active());
        assert!(!store.get(&Address::from_low_u64_be(2), &hash).unwrap().is_active());
    }

    #[test]
    fn test_removed_entry_is_dropped() {
        let store = InMemoryCommitmentStore::new();
        let asset = Address::from_low_u64_be(1);
        let hash = H256::from_low_u64_be(1);

        store.put(&asset, &hash, Address::from_low_u64_be(5)).unwrap();
        assert_eq!(store.len(), 1);
        store.remove(&asset, &hash).unwrap();
        assert!(store.is_empty());

        assert!(matches!(
            store.remove(&asset, &hash),
            Err(StoreError::Missing { .. })
        ));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let store = InMemoryCommitmentStore::new();
        let asset = Address::from_low_u64_be(1);
        let owner = Address::from_low_u64_be(5);
        store.put(&asset, &H256::from_low_u64_be(9), owner).unwrap();

        let mut batch = CommitmentBatch::new();
        batch.create(asset, H256::from_low_u64_be(1), owner);
        batch.create(asset, H256::from_low_u64_be(9), owner);

        assert!(matches!(
            store.write_batch(&batch),
            Err(StoreError::Occupied { .. })
        ));
        assert_eq!(store.len(), 1);
    }
}
