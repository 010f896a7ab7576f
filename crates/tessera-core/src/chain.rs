//! Bounded-history chain tracking.
//!
//! [`ChainManager`] keeps one immutable ledger snapshot per retained block,
//! selects the best tip by strict height (ties keep the block seen first),
//! refuses children of parents that lag the best tip by more than the
//! configured cutoff, and hosts the pending-transaction pool used to build
//! the next block.
//!
//! Block acceptance rules, checked in order (first failure wins):
//! 1. the block names a parent (only genesis may not)
//! 2. the coinbase has no inputs and exactly one output worth the reward
//! 3. the block is not already tracked
//! 4. the parent is tracked (neither unknown nor pruned)
//! 5. `parent_height >= best_height - cutoff_age`
//! 6. every transaction is valid on its own against the parent's snapshot,
//!    and the batch then applies in order without conflicts
//!
//! Rule 6 means a block cannot spend outputs created by its own
//! transactions; such a spend has to wait for a later block.
//!
//! A rejected block leaves the manager untouched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ChainConfig;
use crate::constants::GENESIS_HEIGHT;
use crate::crypto::Ed25519Verifier;
use crate::epoch;
use crate::error::BlockRejection;
use crate::mempool::TransactionPool;
use crate::traits::SignatureVerifier;
use crate::types::{Block, Hash256, OwnerKey, Transaction};
use crate::utxo::UtxoSet;
use crate::validation;

/// A retained block with its height and post-block ledger snapshot.
#[derive(Debug, Clone)]
pub struct ChainEntry {
    pub block: Block,
    pub hash: Hash256,
    pub height: u64,
    /// UTXO set after this block's transactions and coinbase. Never mutated.
    pub utxos: Arc<UtxoSet>,
}

/// Summary of a successful [`ChainManager::try_add_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAccepted {
    pub hash: Hash256,
    pub height: u64,
    /// Whether the block became the new best tip.
    pub new_best: bool,
    /// Number of non-coinbase transactions applied.
    pub transactions: usize,
    /// Number of blocks dropped from the retained window.
    pub pruned: usize,
}

/// Owns the retained block window, the best tip, and the pending pool.
///
/// Single-writer: every mutating method takes `&mut self`. Wrap in
/// [`SharedChain`](crate::shared::SharedChain) for concurrent callers.
pub struct ChainManager {
    config: ChainConfig,
    verifier: Arc<dyn SignatureVerifier>,
    /// Retained blocks by hash.
    entries: HashMap<Hash256, Arc<ChainEntry>>,
    /// Current best tip. Always present in `entries`.
    best: Arc<ChainEntry>,
    pending: TransactionPool,
}

impl ChainManager {
    /// Start a chain from `genesis`, verifying signatures with Ed25519.
    pub fn new(genesis: Block, config: ChainConfig) -> Self {
        Self::with_verifier(genesis, config, Arc::new(Ed25519Verifier))
    }

    /// Start a chain from `genesis` with a caller-supplied signature capability.
    ///
    /// The genesis block is trusted: its transactions are applied best-effort
    /// to an empty set, then its coinbase outputs are credited without any
    /// reward check.
    pub fn with_verifier(
        genesis: Block,
        config: ChainConfig,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        let (outcome, mut utxos) =
            epoch::apply_best_effort(&UtxoSet::new(), &genesis.transactions, verifier.as_ref());
        if !outcome.rejected.is_empty() {
            debug!(
                dropped = outcome.rejected.len(),
                "chain: genesis transactions skipped"
            );
        }
        utxos.credit_transaction(&genesis.coinbase);

        let hash = genesis.hash();
        let entry = Arc::new(ChainEntry {
            block: genesis,
            hash,
            height: GENESIS_HEIGHT,
            utxos: Arc::new(utxos),
        });
        info!(hash = %hash.short(), utxos = entry.utxos.len(), "chain: genesis initialized");

        let mut entries = HashMap::new();
        entries.insert(hash, Arc::clone(&entry));

        Self {
            config,
            verifier,
            entries,
            best: entry,
            pending: TransactionPool::new(),
        }
    }

    /// Accept or reject `block`, returning `true` if it was added.
    pub fn add_block(&mut self, block: Block) -> bool {
        self.try_add_block(block).is_ok()
    }

    /// Accept or reject `block`, reporting why on rejection.
    pub fn try_add_block(&mut self, block: Block) -> Result<BlockAccepted, BlockRejection> {
        let hash = block.hash();
        match self.admit(block, hash) {
            Ok(accepted) => {
                info!(
                    height = accepted.height,
                    hash = %hash.short(),
                    txs = accepted.transactions,
                    new_best = accepted.new_best,
                    "chain: block accepted"
                );
                Ok(accepted)
            }
            Err(reason) => {
                debug!(hash = %hash.short(), %reason, "chain: block rejected");
                Err(reason)
            }
        }
    }

    fn admit(&mut self, block: Block, hash: Hash256) -> Result<BlockAccepted, BlockRejection> {
        let prev_hash = block.prev_hash.ok_or(BlockRejection::MissingParent)?;

        self.check_coinbase(&block.coinbase)?;

        if self.entries.contains_key(&hash) {
            return Err(BlockRejection::DuplicateBlock);
        }

        let parent = self
            .entries
            .get(&prev_hash)
            .cloned()
            .ok_or(BlockRejection::UnknownParent(prev_hash))?;

        let best_height = self.best.height;
        if parent.height < best_height.saturating_sub(self.config.cutoff_age) {
            return Err(BlockRejection::StaleParent {
                parent_height: parent.height,
                best_height,
                cutoff_age: self.config.cutoff_age,
            });
        }

        let (accepted, mut utxos) =
            epoch::apply_strict(&parent.utxos, &block.transactions, self.verifier.as_ref())?;
        utxos.credit_transaction(&block.coinbase);

        let height = parent.height + 1;
        let entry = Arc::new(ChainEntry {
            block,
            hash,
            height,
            utxos: Arc::new(utxos),
        });
        self.entries.insert(hash, Arc::clone(&entry));

        let new_best = height > best_height;
        if new_best {
            self.best = entry;
        }

        self.pending.clear();
        let pruned = self.prune();

        Ok(BlockAccepted {
            hash,
            height,
            new_best,
            transactions: accepted.len(),
            pruned,
        })
    }

    fn check_coinbase(&self, coinbase: &Transaction) -> Result<(), BlockRejection> {
        if !coinbase.is_coinbase() {
            return Err(BlockRejection::InvalidCoinbase("coinbase must have no inputs".into()));
        }
        let [output] = coinbase.outputs.as_slice() else {
            return Err(BlockRejection::InvalidCoinbase(format!(
                "expected exactly one output, got {}",
                coinbase.outputs.len()
            )));
        };
        if output.value != self.config.coinbase_reward {
            return Err(BlockRejection::InvalidCoinbase(format!(
                "reward {}, expected {}",
                output.value, self.config.coinbase_reward
            )));
        }
        Ok(())
    }

    /// Drop blocks below `best_height - cutoff_age - 1`.
    ///
    /// Children of anything below `best_height - cutoff_age` are refused
    /// anyway; the extra generation is kept so such children are reported as
    /// [`BlockRejection::StaleParent`] rather than unknown.
    fn prune(&mut self) -> usize {
        let Some(floor) = self
            .best
            .height
            .checked_sub(self.config.cutoff_age.saturating_add(1))
        else {
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.height >= floor);
        let pruned = before - self.entries.len();
        if pruned > 0 {
            debug!(pruned, floor, retained = self.entries.len(), "chain: pruned blocks");
        }
        pruned
    }

    /// Build a child of the best block from the pending pool.
    ///
    /// Pending transactions that are valid against the best snapshot are
    /// applied best-effort, in submission order; the accepted subset becomes
    /// the block's batch, so the result passes the strict batch check. The
    /// coinbase pays the configured reward to `coinbase_owner`. The block is
    /// not added; pass it to [`add_block`](Self::add_block).
    pub fn create_block(&self, coinbase_owner: OwnerKey, timestamp: u64) -> Block {
        let height = self.best.height + 1;
        let verifier = self.verifier.as_ref();
        let candidates: Vec<Transaction> = self
            .pending
            .transactions()
            .into_iter()
            .filter(|tx| validation::is_valid_transaction(&self.best.utxos, tx, verifier))
            .collect();
        let (outcome, _) =
            epoch::apply_best_effort(&self.best.utxos, &candidates, verifier);
        debug!(
            height,
            included = outcome.accepted.len(),
            skipped = self.pending.len() - outcome.accepted.len(),
            "chain: block template built"
        );
        Block {
            prev_hash: Some(self.best.hash),
            coinbase: Transaction::coinbase(self.config.coinbase_reward, coinbase_owner, height),
            transactions: outcome.accepted,
            timestamp,
        }
    }

    /// Add a transaction to the pending pool without validating it.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Hash256 {
        let (txid, fresh) = self.pending.insert(tx);
        if fresh {
            debug!(
                txid = %txid.short(),
                pending = self.pending.len(),
                "chain: transaction submitted"
            );
        }
        txid
    }

    /// The current best block.
    pub fn best_block(&self) -> &Block {
        &self.best.block
    }

    /// Ledger snapshot after the best block, for building its child.
    pub fn best_utxo_set(&self) -> Arc<UtxoSet> {
        Arc::clone(&self.best.utxos)
    }

    pub fn best_height(&self) -> u64 {
        self.best.height
    }

    pub fn best_hash(&self) -> Hash256 {
        self.best.hash
    }

    /// Transactions submitted since the last accepted block.
    pub fn pending_pool(&self) -> &TransactionPool {
        &self.pending
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn contains_block(&self, hash: &Hash256) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn get_block(&self, hash: &Hash256) -> Option<&Block> {
        self.entries.get(hash).map(|e| &e.block)
    }

    pub fn height_of(&self, hash: &Hash256) -> Option<u64> {
        self.entries.get(hash).map(|e| e.height)
    }

    /// Ledger snapshot after a retained block.
    pub fn utxo_set_at(&self, hash: &Hash256) -> Option<Arc<UtxoSet>> {
        self.entries.get(hash).map(|e| Arc::clone(&e.utxos))
    }

    /// Number of retained blocks.
    pub fn block_count(&self) -> usize {
        self.entries.len()
    }

    /// Lowest retained height.
    pub fn lowest_height(&self) -> u64 {
        self.entries
            .values()
            .map(|e| e.height)
            .min()
            .unwrap_or(self.best.height)
    }
}

impl fmt::Debug for ChainManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainManager")
            .field("config", &self.config)
            .field("best_height", &self.best.height)
            .field("best_hash", &self.best.hash)
            .field("retained", &self.entries.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{self, KeyPair};
    use crate::error::{BatchError, TransactionError};
    use crate::types::{OutPoint, TxInput, TxOutput};

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn genesis_for(kp: &KeyPair) -> Block {
        Block {
            prev_hash: None,
            coinbase: Transaction::coinbase(25, kp.owner_key(), 1),
            transactions: vec![],
            timestamp: 0,
        }
    }

    fn child(parent: Hash256, miner: OwnerKey, height: u64, txs: Vec<Transaction>) -> Block {
        Block {
            prev_hash: Some(parent),
            coinbase: Transaction::coinbase(25, miner, height),
            transactions: txs,
            timestamp: height,
        }
    }

    fn pay(kp: &KeyPair, from: OutPoint, value: u64, to: OwnerKey) -> Transaction {
        let mut tx = Transaction {
            version: 1,
            inputs: vec![TxInput { previous_output: from, signature: vec![] }],
            outputs: vec![TxOutput { value, owner: to }],
            nonce: 0,
        };
        crypto::sign_transaction_input(&mut tx, 0, kp).unwrap();
        tx
    }

    fn coinbase_point(block: &Block) -> OutPoint {
        OutPoint::new(block.coinbase.txid(), 0)
    }

    fn setup() -> (ChainManager, KeyPair, Block) {
        let kp = KeyPair::from_secret_bytes([7; 32]);
        let genesis = genesis_for(&kp);
        (ChainManager::new(genesis.clone(), ChainConfig::default()), kp, genesis)
    }

    /// Extend the best tip `n` times with empty blocks; returns the new blocks.
    fn extend(chain: &mut ChainManager, n: u64) -> Vec<Block> {
        (0..n)
            .map(|_| {
                let height = chain.best_height() + 1;
                let block = child(chain.best_hash(), OwnerKey([0xEE; 32]), height, vec![]);
                assert!(chain.add_block(block.clone()));
                block
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Genesis
    // ------------------------------------------------------------------

    #[test]
    fn genesis_is_best_at_height_one() {
        let (chain, kp, genesis) = setup();
        assert_eq!(chain.best_height(), 1);
        assert_eq!(chain.best_block(), &genesis);
        assert_eq!(chain.block_count(), 1);
        assert_eq!(chain.best_utxo_set().balance_of(&kp.owner_key()), 25);
        assert!(chain.pending_pool().is_empty());
    }

    #[test]
    fn genesis_coinbase_not_reward_checked() {
        let kp = KeyPair::generate();
        let mut genesis = genesis_for(&kp);
        genesis.coinbase.outputs[0].value = 1_000;
        let chain = ChainManager::new(genesis, ChainConfig::default());
        assert_eq!(chain.best_utxo_set().total_value(), Some(1_000));
    }

    #[test]
    fn genesis_transactions_applied_best_effort() {
        let kp = KeyPair::generate();
        let mut genesis = genesis_for(&kp);
        // Spends nothing that exists yet; dropped without failing genesis.
        genesis.transactions.push(pay(&kp, OutPoint::new(Hash256([1; 32]), 0), 5, kp.owner_key()));
        let chain = ChainManager::new(genesis, ChainConfig::default());
        assert_eq!(chain.best_utxo_set().len(), 1);
    }

    // ------------------------------------------------------------------
    // Acceptance
    // ------------------------------------------------------------------

    #[test]
    fn accepts_child_spending_genesis_coinbase() {
        let (mut chain, kp, genesis) = setup();
        let k2 = OwnerKey([2; 32]);
        let k3 = OwnerKey([3; 32]);
        let tx = pay(&kp, coinbase_point(&genesis), 25, k3);
        let b1 = child(genesis.hash(), k2, 2, vec![tx.clone()]);

        let accepted = chain.try_add_block(b1.clone()).unwrap();
        assert_eq!(accepted.height, 2);
        assert!(accepted.new_best);
        assert_eq!(accepted.transactions, 1);
        assert_eq!(chain.best_block(), &b1);

        let utxos = chain.best_utxo_set();
        assert!(!utxos.contains(&coinbase_point(&genesis)));
        assert!(utxos.contains(&coinbase_point(&b1)));
        assert!(utxos.contains(&OutPoint::new(tx.txid(), 0)));
        assert_eq!(utxos.balance_of(&k3), 25);
    }

    #[test]
    fn parent_snapshot_is_never_mutated() {
        let (mut chain, kp, genesis) = setup();
        let before = chain.utxo_set_at(&genesis.hash()).unwrap();
        let tx = pay(&kp, coinbase_point(&genesis), 25, OwnerKey([3; 32]));
        assert!(chain.add_block(child(genesis.hash(), OwnerKey([2; 32]), 2, vec![tx])));
        let after = chain.utxo_set_at(&genesis.hash()).unwrap();
        assert_eq!(*before, *after);
        assert!(after.contains(&coinbase_point(&genesis)));
    }

    #[test]
    fn accepted_block_clears_pending_pool() {
        let (mut chain, kp, genesis) = setup();
        chain.submit_transaction(pay(&kp, coinbase_point(&genesis), 10, OwnerKey([3; 32])));
        assert_eq!(chain.pending_pool().len(), 1);
        extend(&mut chain, 1);
        assert!(chain.pending_pool().is_empty());
    }

    #[test]
    fn rejected_block_keeps_pending_pool() {
        let (mut chain, kp, genesis) = setup();
        chain.submit_transaction(pay(&kp, coinbase_point(&genesis), 10, OwnerKey([3; 32])));
        let orphan = child(Hash256([9; 32]), OwnerKey([2; 32]), 2, vec![]);
        assert!(!chain.add_block(orphan));
        assert_eq!(chain.pending_pool().len(), 1);
    }

    // ------------------------------------------------------------------
    // Rejection rules
    // ------------------------------------------------------------------

    #[test]
    fn rejects_second_genesis() {
        let (mut chain, _, _) = setup();
        let other = genesis_for(&KeyPair::generate());
        assert_eq!(chain.try_add_block(other), Err(BlockRejection::MissingParent));
        assert_eq!(chain.block_count(), 1);
    }

    #[test]
    fn rejects_wrong_reward() {
        let (mut chain, _, genesis) = setup();
        let mut block = child(genesis.hash(), OwnerKey([2; 32]), 2, vec![]);
        block.coinbase.outputs[0].value = 26;
        assert!(matches!(
            chain.try_add_block(block),
            Err(BlockRejection::InvalidCoinbase(_))
        ));
    }

    #[test]
    fn rejects_split_coinbase() {
        let (mut chain, _, genesis) = setup();
        let mut block = child(genesis.hash(), OwnerKey([2; 32]), 2, vec![]);
        block.coinbase.outputs = vec![
            TxOutput { value: 20, owner: OwnerKey([2; 32]) },
            TxOutput { value: 5, owner: OwnerKey([2; 32]) },
        ];
        assert!(!chain.add_block(block));
    }

    #[test]
    fn rejects_coinbase_with_inputs() {
        let (mut chain, kp, genesis) = setup();
        let mut block = child(genesis.hash(), OwnerKey([2; 32]), 2, vec![]);
        block.coinbase = pay(&kp, coinbase_point(&genesis), 25, OwnerKey([2; 32]));
        assert!(matches!(
            chain.try_add_block(block),
            Err(BlockRejection::InvalidCoinbase(_))
        ));
    }

    #[test]
    fn coinbase_checked_before_parent() {
        let (mut chain, _, _) = setup();
        let mut block = child(Hash256([9; 32]), OwnerKey([2; 32]), 2, vec![]);
        block.coinbase.outputs.clear();
        assert!(matches!(
            chain.try_add_block(block),
            Err(BlockRejection::InvalidCoinbase(_))
        ));
    }

    #[test]
    fn rejects_unknown_parent() {
        let (mut chain, _, _) = setup();
        let block = child(Hash256([9; 32]), OwnerKey([2; 32]), 2, vec![]);
        assert_eq!(
            chain.try_add_block(block),
            Err(BlockRejection::UnknownParent(Hash256([9; 32])))
        );
    }

    #[test]
    fn rejects_duplicate_block() {
        let (mut chain, _, genesis) = setup();
        let block = child(genesis.hash(), OwnerKey([2; 32]), 2, vec![]);
        assert!(chain.add_block(block.clone()));
        chain.submit_transaction(Transaction::coinbase(1, OwnerKey([5; 32]), 9));

        assert_eq!(chain.try_add_block(block), Err(BlockRejection::DuplicateBlock));
        assert_eq!(chain.block_count(), 2);
        assert_eq!(chain.pending_pool().len(), 1);
    }

    #[test]
    fn rejects_block_with_invalid_transaction() {
        let (mut chain, kp, genesis) = setup();
        let good = pay(&kp, coinbase_point(&genesis), 25, OwnerKey([3; 32]));
        let double = pay(&kp, coinbase_point(&genesis), 25, OwnerKey([4; 32]));
        let block = child(genesis.hash(), OwnerKey([2; 32]), 2, vec![good, double.clone()]);

        let err = chain.try_add_block(block).unwrap_err();
        assert_eq!(
            err,
            BlockRejection::InvalidTransactions(BatchError::Rejected {
                index: 1,
                txid: double.txid(),
                source: TransactionError::UnknownUtxo(coinbase_point(&genesis).to_string()),
            })
        );
        assert_eq!(chain.best_height(), 1);
        assert_eq!(chain.block_count(), 1);
    }

    #[test]
    fn rejects_block_spending_its_own_output() {
        let (mut chain, kp, genesis) = setup();
        let k3 = KeyPair::from_secret_bytes([3; 32]);
        let t1 = pay(&kp, coinbase_point(&genesis), 25, k3.owner_key());
        let t2 = pay(&k3, OutPoint::new(t1.txid(), 0), 25, OwnerKey([4; 32]));
        let block = child(genesis.hash(), OwnerKey([2; 32]), 2, vec![t1.clone(), t2.clone()]);

        assert_eq!(
            chain.try_add_block(block),
            Err(BlockRejection::InvalidTransactions(BatchError::Rejected {
                index: 1,
                txid: t2.txid(),
                source: TransactionError::UnknownUtxo(OutPoint::new(t1.txid(), 0).to_string()),
            }))
        );
        assert_eq!(chain.best_height(), 1);

        // Split across two blocks, the same spends go through.
        let b1 = child(genesis.hash(), OwnerKey([2; 32]), 2, vec![t1]);
        assert!(chain.add_block(b1.clone()));
        assert!(chain.add_block(child(b1.hash(), OwnerKey([2; 32]), 3, vec![t2])));
        assert_eq!(chain.best_utxo_set().balance_of(&OwnerKey([4; 32])), 25);
    }

    // ------------------------------------------------------------------
    // Fork choice and cutoff
    // ------------------------------------------------------------------

    #[test]
    fn tie_keeps_first_seen_best() {
        let (mut chain, _, genesis) = setup();
        let a = child(genesis.hash(), OwnerKey([2; 32]), 2, vec![]);
        let b = child(genesis.hash(), OwnerKey([3; 32]), 2, vec![]);
        assert!(chain.add_block(a.clone()));
        let accepted = chain.try_add_block(b.clone()).unwrap();
        assert!(!accepted.new_best);
        assert_eq!(chain.best_block(), &a);
        assert!(chain.contains_block(&b.hash()));
    }

    #[test]
    fn longer_fork_takes_over() {
        let (mut chain, _, genesis) = setup();
        let a = child(genesis.hash(), OwnerKey([2; 32]), 2, vec![]);
        let b = child(genesis.hash(), OwnerKey([3; 32]), 2, vec![]);
        let b2 = child(b.hash(), OwnerKey([3; 32]), 3, vec![]);
        assert!(chain.add_block(a));
        assert!(chain.add_block(b));
        assert!(chain.add_block(b2.clone()));
        assert_eq!(chain.best_block(), &b2);
        assert_eq!(chain.best_height(), 3);
    }

    #[test]
    fn fork_snapshots_are_independent() {
        let (mut chain, kp, genesis) = setup();
        let b1 = child(
            genesis.hash(),
            OwnerKey([2; 32]),
            2,
            vec![pay(&kp, coinbase_point(&genesis), 25, OwnerKey([3; 32]))],
        );
        let b2 = child(
            genesis.hash(),
            OwnerKey([4; 32]),
            2,
            vec![pay(&kp, coinbase_point(&genesis), 25, OwnerKey([5; 32]))],
        );
        assert!(chain.add_block(b1.clone()));
        assert!(chain.add_block(b2));

        let again = child(
            b1.hash(),
            OwnerKey([2; 32]),
            3,
            vec![pay(&kp, coinbase_point(&genesis), 25, OwnerKey([6; 32]))],
        );
        assert!(!chain.add_block(again));
    }

    #[test]
    fn cutoff_boundary_is_inclusive() {
        let (mut chain, _, genesis) = setup();
        extend(&mut chain, 10);
        assert_eq!(chain.best_height(), 11);

        // Parent height 1 == 11 - 10: still eligible.
        let fork = child(genesis.hash(), OwnerKey([9; 32]), 2, vec![]);
        assert!(chain.add_block(fork));
        assert_eq!(chain.best_height(), 11);
    }

    #[test]
    fn stale_parent_rejected() {
        let (mut chain, _, genesis) = setup();
        extend(&mut chain, 11);
        assert_eq!(chain.best_height(), 12);

        let fork = child(genesis.hash(), OwnerKey([9; 32]), 2, vec![]);
        assert_eq!(
            chain.try_add_block(fork),
            Err(BlockRejection::StaleParent { parent_height: 1, best_height: 12, cutoff_age: 10 })
        );
    }

    #[test]
    fn pruning_bounds_retained_window() {
        let (mut chain, _, genesis) = setup();
        extend(&mut chain, 30);
        assert_eq!(chain.best_height(), 31);
        // Heights 20..=31 retained.
        assert_eq!(chain.block_count(), 12);
        assert_eq!(chain.lowest_height(), 20);
        assert!(!chain.contains_block(&genesis.hash()));

        let orphaned = child(genesis.hash(), OwnerKey([9; 32]), 2, vec![]);
        assert_eq!(
            chain.try_add_block(orphaned),
            Err(BlockRejection::UnknownParent(genesis.hash()))
        );
    }

    #[test]
    fn custom_cutoff_respected() {
        let kp = KeyPair::generate();
        let genesis = genesis_for(&kp);
        let config = ChainConfig { cutoff_age: 2, ..ChainConfig::default() };
        let mut chain = ChainManager::new(genesis.clone(), config);
        extend(&mut chain, 3);
        assert_eq!(chain.best_height(), 4);
        assert!(matches!(
            chain.try_add_block(child(genesis.hash(), OwnerKey([9; 32]), 2, vec![])),
            Err(BlockRejection::StaleParent { .. })
        ));
    }

    // ------------------------------------------------------------------
    // Block construction
    // ------------------------------------------------------------------

    #[test]
    fn create_block_includes_valid_pending_only() {
        let (mut chain, kp, genesis) = setup();
        let good = pay(&kp, coinbase_point(&genesis), 20, OwnerKey([3; 32]));
        let conflict = pay(&kp, coinbase_point(&genesis), 25, OwnerKey([4; 32]));
        chain.submit_transaction(good.clone());
        chain.submit_transaction(conflict);

        let block = chain.create_block(OwnerKey([2; 32]), 100);
        assert_eq!(block.prev_hash, Some(genesis.hash()));
        assert_eq!(block.transactions, vec![good]);
        assert_eq!(block.coinbase.outputs[0].value, 25);

        assert!(chain.add_block(block));
        assert_eq!(chain.best_height(), 2);
        assert_eq!(chain.best_utxo_set().balance_of(&OwnerKey([3; 32])), 20);
    }

    #[test]
    fn create_block_defers_dependent_pending() {
        let (mut chain, kp, genesis) = setup();
        let k3 = KeyPair::from_secret_bytes([3; 32]);
        let t1 = pay(&kp, coinbase_point(&genesis), 25, k3.owner_key());
        let t2 = pay(&k3, OutPoint::new(t1.txid(), 0), 25, OwnerKey([4; 32]));
        chain.submit_transaction(t1.clone());
        chain.submit_transaction(t2);

        let block = chain.create_block(OwnerKey([2; 32]), 100);
        assert_eq!(block.transactions, vec![t1]);
        assert!(chain.add_block(block));
    }

    #[test]
    fn debug_shows_summary() {
        let (chain, _, _) = setup();
        let debug = format!("{chain:?}");
        assert!(debug.contains("ChainManager"));
        assert!(debug.contains("best_height: 1"));
    }
}
