//! Ledger error taxonomy
//!
//! Every variant aborts the whole operation; nothing is retried and no state
//! or token movement survives an error.

use web3::types::{Address, H256, U256};

use crate::assets::AssetError;
use crate::crypto::CryptoError;
use crate::database::StoreError;
use crate::utxo::TransactionShape;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    // Structural / input errors
    #[error("asset identifier is zero")]
    ZeroAsset,

    #[error("amount is zero")]
    ZeroAmount,

    #[error("owner address is zero")]
    ZeroAddress,

    #[error("transaction expired: deadline {deadline} <= now {now}")]
    DeadlineExpired { deadline: u64, now: u64 },

    #[error("fee must be zero, got {0}")]
    NonZeroFee(U256),

    #[error("transaction has no inputs")]
    EmptyInputs,

    #[error("transaction has no outputs")]
    EmptyOutputs,

    #[error("unsupported transaction shape {0}")]
    UnsupportedTransactionShape(TransactionShape),

    #[error("index {index} out of bounds for {len} entries")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("index {0} listed more than once")]
    DuplicateIndex(usize),

    #[error("witness indices cover {covered} positions, expected {expected}")]
    IncompleteIndexCoverage { expected: usize, covered: usize },

    #[error("witness group lists no indices")]
    EmptyWitnessGroup,

    #[error("deposit expects {expected} commitments, got {got}")]
    InvalidDepositArity { expected: usize, got: usize },

    #[error("commitment {0:?} appears more than once")]
    DuplicateCommitment(H256),

    #[error("value outside the proof field: {0}")]
    FieldOverflow(String),

    // State errors
    #[error("commitment {0:?} is already in use")]
    CommitmentAlreadyUsed(H256),

    #[error("input commitment {0:?} not found")]
    InputCommitmentNotFound(H256),

    #[error("commitment {0:?} not found")]
    CommitmentNotFound(H256),

    #[error("caller {caller:?} is not authorized")]
    Unauthorized { caller: Address },

    #[error("input {hash:?} is owned by {found:?}, witness group owner is {expected:?}")]
    MixedOwnerWitness {
        hash: H256,
        expected: Address,
        found: Address,
    },

    // Authorization errors
    #[error("invalid signature for owner {owner:?}")]
    InvalidSignature { owner: Address },

    // Proof errors
    #[error("invalid proof")]
    InvalidProof,

    // Execution environment
    #[error("reentrant call into the ledger")]
    ReentrantCall,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Crypto(CryptoError),
}

impl From<CryptoError> for LedgerError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::FieldOverflow(value) => LedgerError::FieldOverflow(value),
            other => LedgerError::Crypto(other),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
