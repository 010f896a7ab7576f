//! The unspent transaction output set.
//!
//! A plain map from [`OutPoint`] to [`TxOutput`] with no policy of its own.
//! Chain tracking keeps one of these per retained block; children start
//! from a clone of their parent's set, so sibling branches never share
//! mutable state.

use std::collections::HashMap;

use crate::types::{OutPoint, OwnerKey, Transaction, TxOutput};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UtxoSet {
    utxos: HashMap<OutPoint, TxOutput>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self { utxos: HashMap::new() }
    }

    /// Insert an output. Returns the previous entry if the outpoint was
    /// already present.
    pub fn add(&mut self, outpoint: OutPoint, output: TxOutput) -> Option<TxOutput> {
        self.utxos.insert(outpoint, output)
    }

    /// Remove (spend) an output.
    pub fn remove(&mut self, outpoint: &OutPoint) -> Option<TxOutput> {
        self.utxos.remove(outpoint)
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&TxOutput> {
        self.utxos.get(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &TxOutput)> {
        self.utxos.iter()
    }

    /// All outpoints, sorted for deterministic iteration.
    pub fn outpoints(&self) -> Vec<OutPoint> {
        let mut points: Vec<OutPoint> = self.utxos.keys().cloned().collect();
        points.sort();
        points
    }

    /// Sum of every unspent value. Returns None on overflow.
    pub fn total_value(&self) -> Option<u64> {
        self.utxos
            .values()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
    }

    /// Total value spendable by `owner` (saturating).
    pub fn balance_of(&self, owner: &OwnerKey) -> u64 {
        self.utxos
            .values()
            .filter(|out| &out.owner == owner)
            .fold(0u64, |acc, out| acc.saturating_add(out.value))
    }

    /// Outputs spendable by `owner`, sorted by outpoint.
    pub fn outputs_owned_by(&self, owner: &OwnerKey) -> Vec<(OutPoint, TxOutput)> {
        let mut owned: Vec<(OutPoint, TxOutput)> = self
            .utxos
            .iter()
            .filter(|(_, out)| &out.owner == owner)
            .map(|(op, out)| (op.clone(), out.clone()))
            .collect();
        owned.sort_by(|a, b| a.0.cmp(&b.0));
        owned
    }

    /// Add one entry per output of `tx`, keyed by `(txid, position)`.
    ///
    /// Inputs are not touched. Used to credit coinbase outputs, which carry
    /// nothing to spend. Returns the number of entries created.
    pub fn credit_transaction(&mut self, tx: &Transaction) -> usize {
        for (outpoint, output) in tx.output_points().zip(&tx.outputs) {
            self.utxos.insert(outpoint, output.clone());
        }
        tx.outputs.len()
    }
}

impl FromIterator<(OutPoint, TxOutput)> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = (OutPoint, TxOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}
