//! Asset ledger
//!
//! The token layer the pool custodies funds in. The commitment ledger only
//! moves value through this trait; it never tracks balances itself.

use dashmap::DashMap;
use web3::types::{Address, U256};

use crate::utxo::AssetId;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("insufficient balance of {asset:?} for {account:?}: need {needed}, have {available}")]
    InsufficientBalance {
        asset: AssetId,
        account: Address,
        needed: U256,
        available: U256,
    },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

pub type AssetResult<T> = Result<T, AssetError>;

/// Fungible token balances held by the pool
pub trait AssetLedger: Send + Sync {
    /// Move `amount` of `asset` from `from` into the pool
    fn transfer_in(&self, asset: &AssetId, from: &Address, amount: U256) -> AssetResult<()>;

    /// Move `amount` of `asset` out of the pool to `to`
    fn transfer_out(&self, asset: &AssetId, to: &Address, amount: U256) -> AssetResult<()>;

    /// Amount of `asset` currently held by the pool
    fn pool_balance(&self, asset: &AssetId) -> U256;
}

/// Account-based token ledger with the pool as one of its accounts
#[derive(Debug)]
pub struct InMemoryAssetLedger {
    pool: Address,
    balances: DashMap<(AssetId, Address), U256>,
}

impl InMemoryAssetLedger {
    pub fn new(pool: Address) -> Self {
        Self {
            pool,
            balances: DashMap::new(),
        }
    }

    pub fn pool_address(&self) -> Address {
        self.pool
    }

    /// Credit an account out of thin air
    pub fn mint(&self, asset: &AssetId, account: &Address, amount: U256) {
        *self.balances.entry((*asset, *account)).or_insert_with(U256::zero) += amount;
    }

    pub fn balance_of(&self, asset: &AssetId, account: &Address) -> U256 {
        self.balances
            .get(&(*asset, *account))
            .map(|b| *b)
            .unwrap_or_default()
    }

    fn transfer(&self, asset: &AssetId, from: &Address, to: &Address, amount: U256) -> AssetResult<()> {
        {
            let mut source = self.balances.entry((*asset, *from)).or_insert_with(U256::zero);
            if *source < amount {
                return Err(AssetError::InsufficientBalance {
                    asset: *asset,
                    account: *from,
                    needed: amount,
                    available: *source,
                });
            }
            *source -= amount;
        }
        *self.balances.entry((*asset, *to)).or_insert_with(U256::zero) += amount;
        Ok(())
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn transfer_in(&self, asset: &AssetId, from: &Address, amount: U256) -> AssetResult<()> {
        self.transfer(asset, from, &self.pool, amount)
    }

    fn transfer_out(&self, asset: &AssetId, to: &Address, amount: U256) -> AssetResult<()> {
        self.transfer(asset, &self.pool, to, amount)
    }

    fn pool_balance(&self, asset: &AssetId) -> U256 {
        self.balance_of(asset, &self.pool)
    }
}
