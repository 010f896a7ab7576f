//! Pending-transaction pool.
//!
//! Holds submitted transactions awaiting inclusion in a block. Nothing is
//! validated on the way in: whichever block later tries to include a
//! transaction decides its fate. Entries are keyed by txid (resubmitting
//! the same transaction is a no-op) and iterate in submission order.

use std::collections::HashMap;

use crate::types::{Hash256, Transaction};

#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    /// Primary storage: txid → transaction.
    entries: HashMap<Hash256, Transaction>,
    /// Submission order of the txids currently in `entries`.
    order: Vec<Hash256>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transaction. Returns its txid and whether it was new.
    pub fn insert(&mut self, tx: Transaction) -> (Hash256, bool) {
        let txid = tx.txid();
        if self.entries.contains_key(&txid) {
            return (txid, false);
        }
        self.order.push(txid);
        self.entries.insert(txid, tx);
        (txid, true)
    }

    pub fn remove(&mut self, txid: &Hash256) -> Option<Transaction> {
        let tx = self.entries.remove(txid)?;
        self.order.retain(|id| id != txid);
        Some(tx)
    }

    pub fn get(&self, txid: &Hash256) -> Option<&Transaction> {
        self.entries.get(txid)
    }

    pub fn contains(&self, txid: &Hash256) -> bool {
        self.entries.contains_key(txid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Transactions in submission order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .cloned()
            .collect()
    }

    /// Txids in submission order.
    pub fn txids(&self) -> &[Hash256] {
        &self.order
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
