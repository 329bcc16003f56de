//! RocksDB Commitment Store
//!
//! Commitments live in a single column family tuned for point lookups.
//! Each ledger batch becomes one RocksDB `WriteBatch` written with sync.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rocksdb::{BlockBasedOptions, ColumnFamily, ColumnFamilyDescriptor, Options, WriteBatch, WriteOptions, DB};
use std::path::Path;

use crate::config::StoreConfig;
use crate::database::keys::commitment_key;
use crate::database::{CommitmentBatch, CommitmentStore, StoreError, StoreResult};
use crate::utxo::{AssetId, Commitment, CommitmentHash};

/// Column family names
pub mod cf_names {
    pub const COMMITMENTS: &str = "cf_commitments";
}

/// Commitment store backed by RocksDB
pub struct RocksCommitmentStore {
    db: DB,
    config: StoreConfig,
    /// Serializes the read-plan-write cycle of batches
    write_lock: Mutex<()>,
}

impl RocksCommitmentStore {
    /// Open (or create) the database at `config.db_path`
    pub fn open(config: StoreConfig) -> Result<Self> {
        let mut cf_opts = Options::default();
        cf_opts.set_write_buffer_size(config.write_buffer_size);
        cf_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        cf_opts.optimize_for_point_lookup(64);

        let mut block_opts = BlockBasedOptions::default();
        if config.enable_bloom_filters {
            block_opts.set_bloom_filter(10.0, false);
            block_opts.set_cache_index_and_filter_blocks(true);
        }
        cf_opts.set_block_based_table_factory(&block_opts);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_open_files(config.max_open_files);

        let descriptors = vec![ColumnFamilyDescriptor::new(cf_names::COMMITMENTS, cf_opts)];
        let db = DB::open_cf_descriptors(&db_opts, Path::new(&config.db_path), descriptors)
            .with_context(|| format!("failed to open commitment store at {}", config.db_path))?;

        log::info!("Opened commitment store at {}", config.db_path);

        Ok(Self {
            db,
            config,
            write_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn commitments_cf(&self) -> StoreResult<&ColumnFamily> {
        self.db
            .cf_handle(cf_names::COMMITMENTS)
            .ok_or_else(|| StoreError::Backend(format!("missing column family {}", cf_names::COMMITMENTS)))
    }
}

impl CommitmentStore for RocksCommitmentStore {
    fn get(&self, asset: &AssetId, hash: &CommitmentHash) -> StoreResult<Commitment> {
        let cf = self.commitments_cf()?;
        let raw = self
            .db
            .get_cf(cf, commitment_key(asset, hash))
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        match raw {
            None => Ok(Commitment::default()),
            Some(bytes) => Commitment::from_bytes(&bytes).ok_or_else(|| {
                StoreError::Corrupt(format!("commitment {:?} has {} byte record", hash, bytes.len()))
            }),
        }
    }

    fn write_batch(&self, batch: &CommitmentBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock();
        let writes = batch.plan(|asset, hash| self.get(asset, hash))?;

        let cf = self.commitments_cf()?;
        let mut write_batch = WriteBatch::default();
        for write in &writes {
            let key = commitment_key(&write.asset, &write.hash);
            match write.value {
                Some(commitment) => write_batch.put_cf(cf, key, commitment.to_bytes()),
                // Removed keys are deleted outright, matching never-written keys
                None => write_batch.delete_cf(cf, key),
            }
        }

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        self.db
            .write_opt(write_batch, &write_opts)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        log::debug!("Committed batch of {} operations ({} keys)", batch.len(), writes.len());
        Ok(())
    }
}
