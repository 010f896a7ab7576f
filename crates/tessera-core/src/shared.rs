//! Lock-guarded chain handle for concurrent callers.
//!
//! Writers hold the write lock for the whole operation, so readers never
//! observe a block that is half applied.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::chain::{BlockAccepted, ChainManager};
use crate::error::BlockRejection;
use crate::types::{Block, Hash256, OwnerKey, Transaction};
use crate::utxo::UtxoSet;

/// Cloneable handle to a [`ChainManager`] behind a `parking_lot::RwLock`.
#[derive(Clone)]
pub struct SharedChain {
    inner: Arc<RwLock<ChainManager>>,
}

impl SharedChain {
    pub fn new(chain: ChainManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    pub fn add_block(&self, block: Block) -> bool {
        self.inner.write().add_block(block)
    }

    pub fn try_add_block(&self, block: Block) -> Result<BlockAccepted, BlockRejection> {
        self.inner.write().try_add_block(block)
    }

    pub fn submit_transaction(&self, tx: Transaction) -> Hash256 {
        self.inner.write().submit_transaction(tx)
    }

    /// Build a block from the pending pool and add it under one write lock,
    /// so no other writer can move the tip in between.
    pub fn create_and_add_block(
        &self,
        coinbase_owner: OwnerKey,
        timestamp: u64,
    ) -> Result<BlockAccepted, BlockRejection> {
        let mut chain = self.inner.write();
        let block = chain.create_block(coinbase_owner, timestamp);
        chain.try_add_block(block)
    }

    pub fn best_block(&self) -> Block {
        self.inner.read().best_block().clone()
    }

    pub fn best_utxo_set(&self) -> Arc<UtxoSet> {
        self.inner.read().best_utxo_set()
    }

    pub fn best_height(&self) -> u64 {
        self.inner.read().best_height()
    }

    /// Best block, its snapshot and its height, read under one lock.
    pub fn best_tip(&self) -> (Block, Arc<UtxoSet>, u64) {
        let chain = self.inner.read();
        (
            chain.best_block().clone(),
            chain.best_utxo_set(),
            chain.best_height(),
        )
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.inner.read().pending_pool().transactions()
    }

    /// Run `f` with read access to the underlying manager.
    pub fn with_chain<R>(&self, f: impl FnOnce(&ChainManager) -> R) -> R {
        f(&self.inner.read())
    }
}

impl std::fmt::Debug for SharedChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedChain")
            .field("best_height", &self.best_height())
            .finish_non_exhaustive()
    }
}
