//! Core ledger types: outputs, outpoints, transactions, blocks.
//!
//! Identities are BLAKE3 digests over explicit little-endian byte layouts,
//! so they never depend on a serializer's framing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::TX_VERSION;

/// A 32-byte hash value. Used for transaction IDs and block hashes.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First four bytes as hex, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Raw Ed25519 public key bytes identifying who may spend an output.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct OwnerKey(pub [u8; 32]);

impl OwnerKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Reference to a specific output of a previous transaction (the UTXO key).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutPoint {
    /// Transaction ID containing the referenced output.
    pub txid: Hash256,
    /// Position of the output within that transaction.
    pub index: u64,
}

impl OutPoint {
    pub fn new(txid: Hash256, index: u64) -> Self {
        Self { txid, index }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// A transaction input, spending a previous output.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    /// The outpoint being spent.
    pub previous_output: OutPoint,
    /// Ed25519 signature (64 bytes) by the owner of the referenced output.
    pub signature: Vec<u8>,
}

/// A transaction output, creating a new UTXO.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// Amount in base units.
    pub value: u64,
    /// Key authorized to spend this output.
    pub owner: OwnerKey,
}

/// A transaction moving value between owners.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Format version.
    pub version: u64,
    /// Inputs consuming previous outputs. Empty for a coinbase.
    pub inputs: Vec<TxInput>,
    /// New outputs created by this transaction.
    pub outputs: Vec<TxOutput>,
    /// Free-form disambiguator. Coinbase builders set the block height here.
    pub nonce: u64,
}

impl Transaction {
    /// A coinbase paying `value` to `owner`, tagged with `height` so that
    /// coinbases at different heights have distinct ids.
    pub fn coinbase(value: u64, owner: OwnerKey, height: u64) -> Self {
        Self {
            version: TX_VERSION,
            inputs: Vec::new(),
            outputs: vec![TxOutput { value, owner }],
            nonce: height,
        }
    }

    /// Compute the transaction ID.
    ///
    /// BLAKE3 over: version || input count || (txid || index || sig len || sig)* ||
    /// output count || (value || owner)* || nonce, integers little-endian.
    pub fn txid(&self) -> Hash256 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.version.to_le_bytes());
        hasher.update(&(self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            hasher.update(input.previous_output.txid.as_bytes());
            hasher.update(&input.previous_output.index.to_le_bytes());
            hasher.update(&(input.signature.len() as u64).to_le_bytes());
            hasher.update(&input.signature);
        }
        hasher.update(&(self.outputs.len() as u64).to_le_bytes());
        for output in &self.outputs {
            hasher.update(&output.value.to_le_bytes());
            hasher.update(output.owner.as_bytes());
        }
        hasher.update(&self.nonce.to_le_bytes());
        Hash256(hasher.finalize().into())
    }

    /// A coinbase mints value and has no inputs.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Sum of all output values. Returns None on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
    }

    /// Outpoints for each of this transaction's outputs, in position order.
    pub fn output_points(&self) -> impl Iterator<Item = OutPoint> + '_ {
        let txid = self.txid();
        (0..self.outputs.len() as u64).map(move |index| OutPoint { txid, index })
    }
}

/// A block: parent link, coinbase, and an ordered transaction batch.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Hash of the parent block. `None` only for genesis.
    pub prev_hash: Option<Hash256>,
    /// The value-creating transaction, credited after the batch is applied.
    pub coinbase: Transaction,
    /// Transactions validated against the parent's ledger snapshot.
    pub transactions: Vec<Transaction>,
    /// Unix timestamp in seconds. Informational only.
    pub timestamp: u64,
}

impl Block {
    /// Compute the block hash.
    ///
    /// BLAKE3 over: parent flag || parent hash (zero for genesis) ||
    /// coinbase txid || tx count || txid* || timestamp.
    pub fn hash(&self) -> Hash256 {
        let mut hasher = blake3::Hasher::new();
        match &self.prev_hash {
            Some(prev) => {
                hasher.update(&[1u8]);
                hasher.update(prev.as_bytes());
            }
            None => {
                hasher.update(&[0u8]);
                hasher.update(Hash256::ZERO.as_bytes());
            }
        }
        hasher.update(self.coinbase.txid().as_bytes());
        hasher.update(&(self.transactions.len() as u64).to_le_bytes());
        for tx in &self.transactions {
            hasher.update(tx.txid().as_bytes());
        }
        hasher.update(&self.timestamp.to_le_bytes());
        Hash256(hasher.finalize().into())
    }

    /// Whether this block has no parent link.
    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_none()
    }
}
