//! Commitment Ledger
//!
//! The transaction state machine. Every operation validates everything it
//! can before touching state, then applies its commitment mutations as one
//! atomic batch and performs the asset transfer last. A failed transfer
//! rolls the batch back, so an error never leaves partial effects.

use std::collections::HashSet;
use std::sync::Arc;

use web3::types::{Address, U256};

use crate::assets::AssetLedger;
use crate::config::LedgerConfig;
use crate::crypto::CommitmentHasher;
use crate::database::{CommitmentBatch, CommitmentStore, StoreError};
use crate::error::{LedgerError, LedgerResult};
use crate::utxo::{AssetId, Commitment, CommitmentHash, DepositSlot, Note, Owner, Transaction};
use crate::verifier::VerifierRegistry;

pub mod authorization;
pub mod clock;
pub mod events;
pub mod guard;
pub mod partition;
pub mod public_inputs;


pub use authorization::authorize_inputs;
pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{EventLog, EventSink, LedgerEvent, LogSink};
pub use guard::OperationGuard;
pub use partition::validate_partition;

/// Privacy pool ledger over one commitment store
pub struct CommitmentLedger {
    config: LedgerConfig,
    store: Arc<dyn CommitmentStore>,
    assets: Arc<dyn AssetLedger>,
    verifiers: VerifierRegistry,
    hasher: Arc<dyn CommitmentHasher>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    guard: OperationGuard,
}

impl CommitmentLedger {
    pub fn new(
        config: LedgerConfig,
        store: Arc<dyn CommitmentStore>,
        assets: Arc<dyn AssetLedger>,
        verifiers: VerifierRegistry,
        hasher: Arc<dyn CommitmentHasher>,
    ) -> Self {
        for shape in &config.supported_shapes {
            if verifiers.spend(shape).is_none() {
                log::warn!("Shape {} is enabled but has no verifier; spends of it will be rejected", shape);
            }
        }

        Self {
            config,
            store,
            assets,
            verifiers,
            hasher,
            clock: Arc::new(SystemClock),
            events: Arc::new(LogSink),
            guard: OperationGuard::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current state of `(asset, hash)`; the empty commitment if none is active
    pub fn get_commitment(&self, asset: &AssetId, hash: &CommitmentHash) -> LedgerResult<Commitment> {
        Ok(self.store.get(asset, hash)?)
    }

    pub fn pool_balance(&self, asset: &AssetId) -> U256 {
        self.assets.pool_balance(asset)
    }

    /// Pull `total` from `payer` into the pool, backed by one new commitment
    /// per slot.
    ///
    /// `proof` must show the slot hashes open to amounts summing to `total`.
    pub fn deposit(
        &self,
        payer: &Address,
        asset: &AssetId,
        total: U256,
        slots: &[DepositSlot],
        proof: &[u8],
    ) -> LedgerResult<()> {
        let _op = self.guard.enter()?;
        let result = self.deposit_inner(payer, asset, total, slots, proof);
        if let Err(e) = &result {
            log::warn!("Deposit of {} {:?} by {:?} rejected: {}", total, asset, payer, e);
        }
        result
    }

    fn deposit_inner(
        &self,
        payer: &Address,
        asset: &AssetId,
        total: U256,
        slots: &[DepositSlot],
        proof: &[u8],
    ) -> LedgerResult<()> {
        if asset.is_zero() {
            return Err(LedgerError::ZeroAsset);
        }
        if payer.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if total.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if slots.len() != self.config.deposit_slots {
            return Err(LedgerError::InvalidDepositArity {
                expected: self.config.deposit_slots,
                got: slots.len(),
            });
        }
        if slots.iter().any(|slot| slot.owner.is_zero()) {
            return Err(LedgerError::ZeroAddress);
        }
        ensure_unique(slots.iter().map(|slot| &slot.hash))?;
        let public_inputs = public_inputs::deposit_inputs(slots, &total)?;

        for slot in slots {
            if self.store.get(asset, &slot.hash)?.is_active() {
                return Err(LedgerError::CommitmentAlreadyUsed(slot.hash));
            }
        }

        if !self.verifiers.deposit().verify(proof, &public_inputs) {
            return Err(LedgerError::InvalidProof);
        }

        let mut batch = CommitmentBatch::new();
        for slot in slots {
            batch.create(*asset, slot.hash, slot.owner);
        }
        self.store.write_batch(&batch).map_err(conflict_error)?;

        if let Err(e) = self.assets.transfer_in(asset, payer, total) {
            self.roll_back(&batch);
            return Err(e.into());
        }

        log::info!("Deposited {} of {:?} into {} commitments", total, asset, slots.len());

        for slot in slots {
            self.events.publish(&LedgerEvent::CommitmentCreated {
                asset: *asset,
                hash: slot.hash,
                owner: slot.owner,
            });
        }
        self.events.publish(&LedgerEvent::Deposited {
            payer: *payer,
            asset: *asset,
            amount: total,
        });
        Ok(())
    }

    /// Consume the inputs of `tx` and create its outputs.
    ///
    /// No tokens move; `proof` must show the inputs and outputs balance.
    pub fn spend(&self, tx: &Transaction, proof: &[u8]) -> LedgerResult<()> {
        let _op = self.guard.enter()?;
        let result = self.spend_inner(tx, proof);
        if let Err(e) = &result {
            log::warn!("Spend of shape {} on {:?} rejected: {}", tx.shape(), tx.asset, e);
        }
        result
    }

    fn spend_inner(&self, tx: &Transaction, proof: &[u8]) -> LedgerResult<()> {
        self.validate_structure(tx)?;

        let input_owners = authorize_inputs(self.store.as_ref(), tx)?;

        let shape = tx.shape();
        let verifier = match self.verifiers.spend(&shape) {
            Some(verifier) if self.config.supports(&shape) => verifier,
            _ => return Err(LedgerError::UnsupportedTransactionShape(shape)),
        };

        for hash in &tx.output_hashes {
            if self.store.get(&tx.asset, hash)?.is_active() {
                return Err(LedgerError::CommitmentAlreadyUsed(*hash));
            }
        }

        let public_inputs = public_inputs::spend_inputs(&tx.input_hashes, &tx.output_hashes, &tx.fee)?;
        if !verifier.verify(proof, &public_inputs) {
            return Err(LedgerError::InvalidProof);
        }

        let mut output_owners = vec![Owner::zero(); tx.output_hashes.len()];
        for witness in &tx.output_witnesses {
            for &index in &witness.indices {
                output_owners[index] = witness.owner;
            }
        }

        let mut batch = CommitmentBatch::new();
        for (hash, owner) in tx.input_hashes.iter().zip(&input_owners) {
            batch.remove(tx.asset, *hash, *owner);
        }
        for (hash, owner) in tx.output_hashes.iter().zip(&output_owners) {
            batch.create(tx.asset, *hash, *owner);
        }
        self.store.write_batch(&batch).map_err(conflict_error)?;

        log::info!(
            "Spent {} inputs into {} outputs on {:?}",
            tx.input_hashes.len(),
            tx.output_hashes.len(),
            tx.asset
        );

        for (hash, owner) in tx.input_hashes.iter().zip(&input_owners) {
            self.events.publish(&LedgerEvent::CommitmentRemoved {
                asset: tx.asset,
                hash: *hash,
                prior_owner: *owner,
            });
        }
        for (hash, owner) in tx.output_hashes.iter().zip(&output_owners) {
            self.events.publish(&LedgerEvent::CommitmentCreated {
                asset: tx.asset,
                hash: *hash,
                owner: *owner,
            });
        }
        self.events.publish(&LedgerEvent::TransactionSpent {
            asset: tx.asset,
            input_hashes: tx.input_hashes.clone(),
            output_hashes: tx.output_hashes.clone(),
            fee: tx.fee,
        });
        Ok(())
    }

    /// Checks that need no state, cheapest first
    fn validate_structure(&self, tx: &Transaction) -> LedgerResult<()> {
        if tx.asset.is_zero() {
            return Err(LedgerError::ZeroAsset);
        }

        let now = self.clock.now();
        if tx.deadline <= now {
            return Err(LedgerError::DeadlineExpired {
                deadline: tx.deadline,
                now,
            });
        }

        if !tx.fee.is_zero() {
            return Err(LedgerError::NonZeroFee(tx.fee));
        }
        if tx.input_hashes.is_empty() {
            return Err(LedgerError::EmptyInputs);
        }
        if tx.output_hashes.is_empty() {
            return Err(LedgerError::EmptyOutputs);
        }

        validate_partition(
            tx.input_witnesses.iter().map(|w| w.indices.as_slice()),
            tx.input_hashes.len(),
        )?;
        validate_partition(
            tx.output_witnesses.iter().map(|w| w.indices.as_slice()),
            tx.output_hashes.len(),
        )?;

        ensure_unique(tx.input_hashes.iter().chain(&tx.output_hashes))?;

        if tx.output_witnesses.iter().any(|w| w.owner.is_zero()) {
            return Err(LedgerError::ZeroAddress);
        }
        Ok(())
    }

    /// Reveal the opening of a commitment owned by `caller` and take its
    /// amount out of the pool.
    pub fn withdraw(&self, caller: &Address, asset: &AssetId, amount: U256, entropy: U256) -> LedgerResult<()> {
        let _op = self.guard.enter()?;
        let result = self.withdraw_inner(caller, asset, amount, entropy);
        if let Err(e) = &result {
            log::warn!("Withdrawal of {} {:?} by {:?} rejected: {}", amount, asset, caller, e);
        }
        result
    }

    fn withdraw_inner(&self, caller: &Address, asset: &AssetId, amount: U256, entropy: U256) -> LedgerResult<()> {
        if asset.is_zero() {
            return Err(LedgerError::ZeroAsset);
        }
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }

        let hash = Note::new(amount, entropy).commitment(self.hasher.as_ref())?;
        let commitment = self.store.get(asset, &hash)?;
        if !commitment.is_active() {
            return Err(LedgerError::CommitmentNotFound(hash));
        }
        if commitment.owner != *caller {
            return Err(LedgerError::Unauthorized { caller: *caller });
        }

        // Commitment goes first so a reentrant withdraw cannot find it
        let mut batch = CommitmentBatch::new();
        batch.remove(*asset, hash, commitment.owner);
        self.store.write_batch(&batch).map_err(conflict_error)?;

        if let Err(e) = self.assets.transfer_out(asset, caller, amount) {
            self.roll_back(&batch);
            return Err(e.into());
        }

        log::info!("Withdrew {} of {:?} to {:?}", amount, asset, caller);

        self.events.publish(&LedgerEvent::CommitmentRemoved {
            asset: *asset,
            hash,
            prior_owner: commitment.owner,
        });
        Ok(())
    }

    /// Move the whole pool balance of `asset` to the operator, ignoring
    /// commitments. Returns the amount swept.
    pub fn emergency_sweep(&self, caller: &Address, asset: &AssetId) -> LedgerResult<U256> {
        let _op = self.guard.enter()?;

        let operator = self.config.operator;
        if operator.is_zero() || *caller != operator {
            log::warn!("Emergency sweep of {:?} refused for {:?}", asset, caller);
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        if asset.is_zero() {
            return Err(LedgerError::ZeroAsset);
        }

        let amount = self.assets.pool_balance(asset);
        if !amount.is_zero() {
            self.assets.transfer_out(asset, &operator, amount)?;
        }

        log::warn!("Emergency sweep moved {} of {:?} to operator {:?}", amount, asset, operator);

        self.events.publish(&LedgerEvent::EmergencySwept {
            operator,
            asset: *asset,
            amount,
        });
        Ok(amount)
    }

    /// Undo an applied batch after a failed transfer
    fn roll_back(&self, batch: &CommitmentBatch) {
        match self.store.write_batch(&batch.inverse()) {
            Ok(()) => log::warn!("Rolled back {} commitment operations", batch.len()),
            Err(e) => log::error!("Rollback of {} commitment operations failed: {}", batch.len(), e),
        }
    }
}

/// Reject repeated hashes
fn ensure_unique<'a>(hashes: impl IntoIterator<Item = &'a CommitmentHash>) -> LedgerResult<()> {
    let mut seen = HashSet::new();
    for hash in hashes {
        if !seen.insert(*hash) {
            return Err(LedgerError::DuplicateCommitment(*hash));
        }
    }
    Ok(())
}

/// Store conflicts surface as the ledger errors a pre-check would have raised
fn conflict_error(err: StoreError) -> LedgerError {
    match err {
        StoreError::Occupied { hash, .. } => LedgerError::CommitmentAlreadyUsed(hash),
        StoreError::Missing { hash, .. } => LedgerError::InputCommitmentNotFound(hash),
        other => LedgerError::Store(other),
    }
}
