//! Privacy Pool Ledger
//!
//! A UTXO commitment ledger: value lives in hidden commitments
//! `H(amount, entropy)` owned by addresses, moved by signed spends whose
//! balance is proven in zero knowledge, and redeemed by revealing the
//! opening.

pub mod assets;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod ledger;
pub mod utxo;
pub mod verifier;

// Re-export main types for easy access
pub use assets::{AssetError, AssetLedger, InMemoryAssetLedger};
pub use config::{LedgerConfig, StoreConfig};
pub use crypto::{CommitmentHasher, EthSigner, FieldElement, PoseidonHasher};
pub use database::{CommitmentStore, InMemoryCommitmentStore, StoreError};
#[cfg(feature = "rocksdb")]
pub use database::RocksCommitmentStore;
pub use error::{LedgerError, LedgerResult};
pub use ledger::{CommitmentLedger, EventLog, EventSink, LedgerEvent};
pub use utxo::{Commitment, DepositSlot, Note, Transaction, TransactionShape};
pub use verifier::{Groth16Verifier, ProofVerifier, VerifierRegistry};
