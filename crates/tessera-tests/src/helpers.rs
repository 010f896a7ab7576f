//! Shared builders for scenario and property tests.

use tessera_core::chain::ChainManager;
use tessera_core::config::ChainConfig;
use tessera_core::crypto::{self, KeyPair};
use tessera_core::types::*;

/// Deterministic keypair from a seed byte.
pub fn key(seed: u8) -> KeyPair {
    KeyPair::from_secret_bytes([seed; 32])
}

/// Owner key with no known secret, for outputs nobody will spend.
pub fn sink(seed: u8) -> OwnerKey {
    OwnerKey([seed; 32])
}

/// Genesis block paying the default reward to `owner`.
pub fn genesis(owner: OwnerKey) -> Block {
    Block {
        prev_hash: None,
        coinbase: Transaction::coinbase(ChainConfig::default().coinbase_reward, owner, 1),
        transactions: vec![],
        timestamp: 0,
    }
}

/// Child of `parent` at `height` with a correct coinbase paying `miner`.
///
/// `height` only seeds the coinbase nonce and timestamp; the manager derives
/// the real height from the parent.
pub fn block_on(parent: Hash256, miner: OwnerKey, height: u64, txs: Vec<Transaction>) -> Block {
    Block {
        prev_hash: Some(parent),
        coinbase: Transaction::coinbase(ChainConfig::default().coinbase_reward, miner, height),
        transactions: txs,
        timestamp: height,
    }
}

/// Outpoint of a block's coinbase output.
pub fn coinbase_outpoint(block: &Block) -> OutPoint {
    OutPoint::new(block.coinbase.txid(), 0)
}

/// Transaction spending `inputs` (each signed by its keypair) into `outputs`.
pub fn signed_tx(
    inputs: &[(&KeyPair, OutPoint)],
    outputs: &[(u64, OwnerKey)],
    nonce: u64,
) -> Transaction {
    let mut tx = Transaction {
        version: 1,
        inputs: inputs
            .iter()
            .map(|(_, op)| TxInput { previous_output: op.clone(), signature: vec![] })
            .collect(),
        outputs: outputs
            .iter()
            .map(|(value, owner)| TxOutput { value: *value, owner: *owner })
            .collect(),
        nonce,
    };
    for (i, (kp, _)) in inputs.iter().enumerate() {
        crypto::sign_transaction_input(&mut tx, i, kp).expect("input index in range");
    }
    tx
}

/// Single-input, single-output payment.
pub fn pay(kp: &KeyPair, from: OutPoint, value: u64, to: OwnerKey) -> Transaction {
    signed_tx(&[(kp, from)], &[(value, to)], 0)
}

/// Fresh manager with default config and a genesis paying `owner`.
pub fn chain_with_genesis(owner: OwnerKey) -> (ChainManager, Block) {
    let g = genesis(owner);
    (ChainManager::new(g.clone(), ChainConfig::default()), g)
}

/// Extend from `parent` with `n` empty blocks mined by `miner`.
///
/// Returns the added blocks in order. Panics if any is rejected.
pub fn extend_from(
    chain: &mut ChainManager,
    parent: &Block,
    miner: OwnerKey,
    n: u64,
) -> Vec<Block> {
    let mut tip = parent.clone();
    let mut start = chain.height_of(&parent.hash()).expect("parent retained");
    let mut out = Vec::with_capacity(n as usize);
    for _ in 0..n {
        start += 1;
        let next = block_on(tip.hash(), miner, start, vec![]);
        let accepted = chain.try_add_block(next.clone());
        assert!(accepted.is_ok(), "extension at height {start} rejected: {accepted:?}");
        tip = next.clone();
        out.push(next);
    }
    out
}
