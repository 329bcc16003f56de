//! Groth16 verifier over BN254

use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_serialize::CanonicalDeserialize;
use ark_snark::SNARK;

use crate::crypto::{CryptoError, CryptoResult, FieldElement};
use crate::verifier::ProofVerifier;

/// Verifies compressed Groth16 proofs against a fixed verifying key
pub struct Groth16Verifier {
    prepared: PreparedVerifyingKey<Bn254>,
    num_public_inputs: usize,
}

impl Groth16Verifier {
    pub fn new(vk: VerifyingKey<Bn254>) -> Self {
        let num_public_inputs = vk.gamma_abc_g1.len().saturating_sub(1);
        Self {
            prepared: ark_groth16::prepare_verifying_key(&vk),
            num_public_inputs,
        }
    }

    /// Load a compressed verifying key
    pub fn from_bytes(vk_bytes: &[u8]) -> CryptoResult<Self> {
        let vk = VerifyingKey::<Bn254>::deserialize_compressed(vk_bytes)
            .map_err(|e| CryptoError::Serialization(format!("bad verifying key: {}", e)))?;
        Ok(Self::new(vk))
    }

    pub fn num_public_inputs(&self) -> usize {
        self.num_public_inputs
    }
}

impl ProofVerifier for Groth16Verifier {
    fn verify(&self, proof: &[u8], public_inputs: &[FieldElement]) -> bool {
        if public_inputs.len() != self.num_public_inputs {
            log::debug!(
                "Public input count {} does not match circuit ({})",
                public_inputs.len(),
                self.num_public_inputs
            );
            return false;
        }

        let proof = match Proof::<Bn254>::deserialize_compressed(proof) {
            Ok(proof) => proof,
            Err(e) => {
                log::debug!("Malformed proof: {}", e);
                return false;
            }
        };

        Groth16::<Bn254>::verify_with_processed_vk(&self.prepared, public_inputs, &proof).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use ark_relations::lc;
    use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
    use ark_serialize::CanonicalSerialize;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    /// Knowledge of `a, b` with `a * b = c` for public `c`
    #[derive(Clone)]
    struct ProductCircuit {
        a: Option<Fr>,
        b: Option<Fr>,
    }

    impl ConstraintSynthesizer<Fr> for ProductCircuit {
        fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
            let a = cs.new_witness_variable(|| self.a.ok_or(SynthesisError::AssignmentMissing))?;
            let b = cs.new_witness_variable(|| self.b.ok_or(SynthesisError::AssignmentMissing))?;
            let c = cs.new_input_variable(|| {
                let a = self.a.ok_or(SynthesisError::AssignmentMissing)?;
                let b = self.b.ok_or(SynthesisError::AssignmentMissing)?;
                Ok(a * b)
            })?;
            cs.enforce_constraint(lc!() + a, lc!() + b, lc!() + c)?;
            Ok(())
        }
    }

    fn setup() -> (Groth16Verifier, Vec<u8>) {
        let mut rng = StdRng::seed_from_u64(42);
        let blank = ProductCircuit { a: None, b: None };
        let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(blank, &mut rng).unwrap();

        let circuit = ProductCircuit {
            a: Some(Fr::from(3u64)),
            b: Some(Fr::from(7u64)),
        };
        let proof = Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap();
        let mut proof_bytes = Vec::new();
        proof.serialize_compressed(&mut proof_bytes).unwrap();

        let mut vk_bytes = Vec::new();
        vk.serialize_compressed(&mut vk_bytes).unwrap();
        (Groth16Verifier::from_bytes(&vk_bytes).unwrap(), proof_bytes)
    }

    #[test]
    fn test_valid_proof_accepted() {
        let (verifier, proof) = setup();
        assert_eq!(verifier.num_public_inputs(), 1);
        assert!(verifier.verify(&proof, &[Fr::from(21u64)]));
    }

    #[test]
    fn test_wrong_public_input_rejected() {
        let (verifier, proof) = setup();
        assert!(!verifier.verify(&proof, &[Fr::from(22u64)]));
        assert!(!verifier.verify(&proof, &[Fr::from(21u64), Fr::from(0u64)]));
    }

    #[test]
    fn test_garbage_proof_rejected() {
        let (verifier, _) = setup();
        assert!(!verifier.verify(&[0xde, 0xad], &[Fr::from(21u64)]));
    }
}
