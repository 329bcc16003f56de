//! UTXO Module
//! Commitment records, client-side notes and spend transactions

pub mod commitment;
pub mod note;
pub mod transaction;

// Re-export main types
pub use commitment::{AssetId, Commitment, CommitmentHash, DepositSlot, Owner};
pub use note::Note;
pub use transaction::{InputWitness, OutputWitness, Transaction, TransactionShape, REFERENCE_SHAPES};
