//! Database Module
//!
//! The commitment store: a point-lookup map `(asset, hash) -> (owner, spent)`
//! behind the [`CommitmentStore`] trait, with an in-memory backend and a
//! RocksDB backend. All mutations go through atomic [`CommitmentBatch`]es.

pub mod batch_writer;
pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod schema;

// Re-export main types
pub use batch_writer::{BatchOperation, CommitmentBatch, PlannedWrite};
pub use memory::InMemoryCommitmentStore;
#[cfg(feature = "rocksdb")]
pub use schema::RocksCommitmentStore;

use crate::utxo::{AssetId, Commitment, CommitmentHash, Owner};

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("commitment {hash:?} of asset {asset:?} is already active")]
    Occupied { asset: AssetId, hash: CommitmentHash },

    #[error("commitment {hash:?} of asset {asset:?} does not exist")]
    Missing { asset: AssetId, hash: CommitmentHash },

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable commitment map.
///
/// `get` returns the empty commitment for keys that were never written or
/// have been removed. `write_batch` applies every operation or none.
pub trait CommitmentStore: Send + Sync {
    fn get(&self, asset: &AssetId, hash: &CommitmentHash) -> StoreResult<Commitment>;

    fn write_batch(&self, batch: &CommitmentBatch) -> StoreResult<()>;

    /// Create a commitment; fails with `Occupied` over an active one
    fn put(&self, asset: &AssetId, hash: &CommitmentHash, owner: Owner) -> StoreResult<()> {
        let mut batch = CommitmentBatch::new();
        batch.create(*asset, *hash, owner);
        self.write_batch(&batch)
    }

    /// Clear a commitment, returning its prior state
    fn remove(&self, asset: &AssetId, hash: &CommitmentHash) -> StoreResult<Commitment> {
        let prior = self.get(asset, hash)?;
        let mut batch = CommitmentBatch::new();
        batch.remove(*asset, *hash, prior.owner);
        self.write_batch(&batch)?;
        Ok(prior)
    }
}

/// Key layout helpers
pub mod keys {
    use super::*;

    /// Prefix of commitment records
    pub const COMMITMENT_PREFIX: u8 = 0x01;

    /// Key length: prefix (1) || asset (20) || hash (32)
    pub const COMMITMENT_KEY_LEN: usize = 53;

    /// Create commitment database key
    pub fn commitment_key(asset: &AssetId, hash: &CommitmentHash) -> [u8; COMMITMENT_KEY_LEN] {
        let mut key = [0u8; COMMITMENT_KEY_LEN];
        key[0] = COMMITMENT_PREFIX;
        key[1..21].copy_from_slice(asset.as_bytes());
        key[21..].copy_from_slice(hash.as_bytes());
        key
    }

}
