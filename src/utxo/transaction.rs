use serde::{Deserialize, Serialize};
use std::fmt;
use web3::ethabi::{encode, Token};
use web3::types::U256;

use crate::crypto::{CryptoResult, CryptoUtils, EthSigner};
use crate::utxo::{AssetId, CommitmentHash, Owner};

/// (input count, output count) of a spend; selects the proof circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionShape {
    pub inputs: usize,
    pub outputs: usize,
}

impl TransactionShape {
    pub const fn new(inputs: usize, outputs: usize) -> Self {
        Self { inputs, outputs }
    }
}

impl fmt::Display for TransactionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.inputs, self.outputs)
    }
}

/// Shapes the reference circuits are compiled for
pub const REFERENCE_SHAPES: [TransactionShape; 8] = [
    TransactionShape::new(1, 1),
    TransactionShape::new(1, 2),
    TransactionShape::new(1, 3),
    TransactionShape::new(2, 1),
    TransactionShape::new(2, 2),
    TransactionShape::new(2, 3),
    TransactionShape::new(3, 1),
    TransactionShape::new(3, 2),
];

/// One signature authorizing the listed positions of `input_hashes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputWitness {
    pub signature: Vec<u8>,
    pub indices: Vec<usize>,
}

/// Recipient of the listed positions of `output_hashes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputWitness {
    pub owner: Owner,
    pub indices: Vec<usize>,
}

/// Spend request: consume `input_hashes`, create `output_hashes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unix seconds; the spend is valid only while `deadline > now`
    pub deadline: u64,
    pub asset: AssetId,
    pub input_hashes: Vec<CommitmentHash>,
    pub output_hashes: Vec<CommitmentHash>,
    pub input_witnesses: Vec<InputWitness>,
    pub output_witnesses: Vec<OutputWitness>,
    /// Reserved, must be zero
    pub fee: U256,
}

impl Transaction {
    /// Unsigned transaction with no witnesses
    pub fn new(
        deadline: u64,
        asset: AssetId,
        input_hashes: Vec<CommitmentHash>,
        output_hashes: Vec<CommitmentHash>,
    ) -> Self {
        Self {
            deadline,
            asset,
            input_hashes,
            output_hashes,
            input_witnesses: Vec::new(),
            output_witnesses: Vec::new(),
            fee: U256::zero(),
        }
    }

    pub fn shape(&self) -> TransactionShape {
        TransactionShape::new(self.input_hashes.len(), self.output_hashes.len())
    }

    /// Assign output positions to a recipient
    pub fn assign_outputs(&mut self, owner: Owner, indices: Vec<usize>) -> &mut Self {
        self.output_witnesses.push(OutputWitness { owner, indices });
        self
    }

    /// Keccak-256 of the ABI encoding of
    /// `(deadline, asset, inputHashes, outputHashes, outputWitnesses, fee)`.
    ///
    /// Input witnesses are excluded: they carry the signatures over this digest.
    pub fn signing_digest(&self) -> [u8; 32] {
        let hashes = |list: &[CommitmentHash]| {
            Token::Array(
                list.iter()
                    .map(|h| Token::FixedBytes(h.as_bytes().to_vec()))
                    .collect(),
            )
        };
        let witnesses = self
            .output_witnesses
            .iter()
            .map(|w| {
                Token::Tuple(vec![
                    Token::Address(w.owner),
                    Token::Array(
                        w.indices
                            .iter()
                            .map(|&i| Token::Uint(U256::from(i)))
                            .collect(),
                    ),
                ])
            })
            .collect();

        let encoded = encode(&[
            Token::Uint(U256::from(self.deadline)),
            Token::Address(self.asset),
            hashes(&self.input_hashes[..]),
            hashes(&self.output_hashes[..]),
            Token::Array(witnesses),
            Token::Uint(self.fee),
        ]);
        CryptoUtils::keccak256(&encoded)
    }

    /// Sign the current payload for the given input positions.
    ///
    /// Output witnesses must be final before signing; changing them
    /// invalidates every input signature.
    pub fn sign_inputs(&mut self, signer: &EthSigner, indices: Vec<usize>) -> CryptoResult<&mut Self> {
        let signature = signer.sign_digest(&self.signing_digest())?;
        self.input_witnesses.push(InputWitness { signature, indices });
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::recover_signer;
    use web3::types::{Address, H256};

    fn sample() -> Transaction {
        let mut tx = Transaction::new(
            1_000,
            Address::from_low_u64_be(1),
            vec![H256::from_low_u64_be(10), H256::from_low_u64_be(11)],
            vec![H256::from_low_u64_be(20)],
        );
        tx.assign_outputs(Address::from_low_u64_be(99), vec![0]);
        tx
    }

    #[test]
    fn test_shape() {
        assert_eq!(sample().shape(), TransactionShape::new(2, 1));
        assert_eq!(sample().shape().to_string(), "2x1");
        assert!(REFERENCE_SHAPES.contains(&TransactionShape::new(3, 2)));
        assert!(!REFERENCE_SHAPES.contains(&TransactionShape::new(3, 3)));
    }

    #[test]
    fn test_digest_ignores_input_witnesses() {
        let mut tx = sample();
        let before = tx.signing_digest();
        tx.sign_inputs(&EthSigner::random(), vec![0, 1]).unwrap();
        assert_eq!(before, tx.signing_digest());
    }

    #[test]
    fn test_digest_covers_every_signed_field() {
        let base = sample().signing_digest();

        let mut tx = sample();
        tx.deadline += 1;
        assert_ne!(base, tx.signing_digest());

        let mut tx = sample();
        tx.asset = Address::from_low_u64_be(2);
        assert_ne!(base, tx.signing_digest());

        let mut tx = sample();
        tx.input_hashes.swap(0, 1);
        assert_ne!(base, tx.signing_digest());

        let mut tx = sample();
        tx.output_hashes[0] = H256::from_low_u64_be(21);
        assert_ne!(base, tx.signing_digest());

        let mut tx = sample();
        tx.output_witnesses[0].owner = Address::from_low_u64_be(98);
        assert_ne!(base, tx.signing_digest());

        let mut tx = sample();
        tx.fee = U256::one();
        assert_ne!(base, tx.signing_digest());
    }

    #[test]
    fn test_signature_recovers_signer() {
        let signer = EthSigner::random();
        let mut tx = sample();
        tx.sign_inputs(&signer, vec![0, 1]).unwrap();

        let recovered = recover_signer(&tx.signing_digest(), &tx.input_witnesses[0].signature).unwrap();
        assert_eq!(recovered, signer.address());
    }
}
