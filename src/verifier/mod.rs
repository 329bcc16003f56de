//! Proof verification
//!
//! Proofs are checked by opaque verifiers, one for deposits and one per
//! supported spend shape. The ledger never looks inside a proof; it only
//! hands over the assembled public inputs and trusts the boolean answer.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::crypto::FieldElement;
use crate::utxo::TransactionShape;

pub mod groth16;

pub use groth16::Groth16Verifier;

/// Verifier of one circuit
pub trait ProofVerifier: Send + Sync {
    /// `false` for malformed proofs as well as proofs over other inputs
    fn verify(&self, proof: &[u8], public_inputs: &[FieldElement]) -> bool;
}

/// Dispatch table from circuit to verifier
#[derive(Clone)]
pub struct VerifierRegistry {
    deposit: Arc<dyn ProofVerifier>,
    spend: BTreeMap<TransactionShape, Arc<dyn ProofVerifier>>,
}

impl VerifierRegistry {
    pub fn new(deposit: Arc<dyn ProofVerifier>) -> Self {
        Self {
            deposit,
            spend: BTreeMap::new(),
        }
    }

    /// Register (or replace) the verifier of a spend shape
    pub fn register_spend(&mut self, shape: TransactionShape, verifier: Arc<dyn ProofVerifier>) {
        if self.spend.insert(shape, verifier).is_some() {
            log::warn!("Replaced verifier for spend shape {}", shape);
        }
    }

    pub fn with_spend(mut self, shape: TransactionShape, verifier: Arc<dyn ProofVerifier>) -> Self {
        self.register_spend(shape, verifier);
        self
    }

    /// Same verifier for every listed shape
    pub fn with_spend_shapes<'a>(
        mut self,
        shapes: impl IntoIterator<Item = &'a TransactionShape>,
        verifier: Arc<dyn ProofVerifier>,
    ) -> Self {
        for shape in shapes {
            self.register_spend(*shape, verifier.clone());
        }
        self
    }

    pub fn deposit(&self) -> &dyn ProofVerifier {
        self.deposit.as_ref()
    }

    pub fn spend(&self, shape: &TransactionShape) -> Option<&dyn ProofVerifier> {
        self.spend.get(shape).map(|v| v.as_ref())
    }

    pub fn shapes(&self) -> impl Iterator<Item = &TransactionShape> {
        self.spend.keys()
    }
}
