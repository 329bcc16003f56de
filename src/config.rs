//! Ledger configuration
//!
//! Loaded from a JSON file and/or environment variables. Every field has a
//! default so an empty `{}` file is a valid configuration.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use web3::types::Address;

use crate::utxo::{TransactionShape, REFERENCE_SHAPES};

/// Commitment store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database path
    pub db_path: String,

    /// Write buffer size of the commitment column family (default: 64MB)
    pub write_buffer_size: usize,

    /// Maximum open files
    pub max_open_files: i32,

    /// Enable bloom filters for point lookups
    pub enable_bloom_filters: bool,

    /// fsync every batch
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "./privacy_pool_db".to_string(),
            write_buffer_size: 64 * 1024 * 1024, // 64MB
            max_open_files: 1000,
            enable_bloom_filters: true,
            sync_writes: true,
        }
    }
}

/// Ledger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Number of commitment slots a deposit creates
    pub deposit_slots: usize,

    /// Spend shapes accepted, provided a verifier is registered for them
    pub supported_shapes: Vec<TransactionShape>,

    /// Principal allowed to run the emergency sweep
    pub operator: Address,

    pub store: StoreConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            deposit_slots: 3,
            supported_shapes: REFERENCE_SHAPES.to_vec(),
            operator: Address::zero(),
            store: StoreConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Read configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `LEDGER_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `LEDGER_OPERATOR`, `LEDGER_DB_PATH` and
    /// `LEDGER_DEPOSIT_SLOTS` when set
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(operator) = env::var("LEDGER_OPERATOR") {
            let bytes = hex::decode(operator.trim_start_matches("0x"))
                .context("LEDGER_OPERATOR is not hex")?;
            if bytes.len() != 20 {
                return Err(anyhow!("LEDGER_OPERATOR must be 20 bytes, got {}", bytes.len()));
            }
            self.operator = Address::from_slice(&bytes);
        }

        if let Ok(path) = env::var("LEDGER_DB_PATH") {
            self.store.db_path = path;
        }

        if let Ok(slots) = env::var("LEDGER_DEPOSIT_SLOTS") {
            self.deposit_slots = slots
                .parse()
                .context("LEDGER_DEPOSIT_SLOTS is not a number")?;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.deposit_slots == 0 {
            return Err(anyhow!("deposit_slots must be at least 1"));
        }
        if let Some(shape) = self
            .supported_shapes
            .iter()
            .find(|s| s.inputs == 0 || s.outputs == 0)
        {
            return Err(anyhow!("shape {} has an empty side", shape));
        }
        Ok(())
    }

    pub fn supports(&self, shape: &TransactionShape) -> bool {
        self.supported_shapes.contains(shape)
    }
}
