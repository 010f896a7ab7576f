//! Deterministic chain simulation driven by a seeded RNG.
//!
//! A fixed set of wallets trades random payments through the pending pool;
//! blocks are built with `create_block` and rotate the coinbase among the
//! wallets. An optional competing fork is then grown from `fork_depth`
//! blocks below the tip.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use tessera_core::crypto::{self, KeyPair};
use tessera_core::types::{Block, Hash256, OwnerKey, Transaction, TxInput, TxOutput};
use tessera_core::utxo::UtxoSet;
use tessera_core::{ChainConfig, ChainManager, SharedChain};

const WALLETS: usize = 4;

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub chain: ChainConfig,
    pub blocks: u64,
    pub fork_depth: u64,
    pub payments_per_block: usize,
    pub seed: u64,
}

#[derive(Debug, Serialize)]
pub struct ForkSummary {
    pub depth: u64,
    pub accepted: u64,
    /// Rejection reason of the first refused fork block, if any.
    pub rejected: Option<String>,
    pub became_best: bool,
}

#[derive(Debug, Serialize)]
pub struct WalletBalance {
    pub owner: String,
    pub balance: u64,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub seed: u64,
    pub best_height: u64,
    pub best_hash: String,
    pub retained_blocks: usize,
    pub utxo_count: usize,
    pub total_value: u64,
    pub submitted_payments: u64,
    pub included_payments: u64,
    pub fork: Option<ForkSummary>,
    pub balances: Vec<WalletBalance>,
}

pub fn run(config: &SimConfig) -> Result<Summary> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let wallets: Vec<KeyPair> = (0..WALLETS)
        .map(|_| KeyPair::from_secret_bytes(rng.r#gen()))
        .collect();

    let genesis = Block {
        prev_hash: None,
        coinbase: Transaction::coinbase(config.chain.coinbase_reward, wallets[0].owner_key(), 1),
        transactions: vec![],
        timestamp: 0,
    };
    let chain = SharedChain::new(ChainManager::new(genesis.clone(), config.chain));
    let mut main_line = vec![genesis.hash()];

    let mut nonce = 0u64;
    let mut submitted = 0u64;
    let mut included = 0u64;

    for round in 1..=config.blocks {
        let snapshot = chain.best_utxo_set();
        for _ in 0..config.payments_per_block {
            nonce += 1;
            if let Some(tx) = random_payment(&mut rng, &wallets, &snapshot, nonce) {
                chain.submit_transaction(tx);
                submitted += 1;
            }
        }

        let miner = wallets[(round as usize) % WALLETS].owner_key();
        let accepted = chain
            .create_and_add_block(miner, round)
            .with_context(|| format!("building block {round}"))?;
        included += accepted.transactions as u64;
        main_line.push(accepted.hash);
        debug!(height = accepted.height, txs = accepted.transactions, "sim: mined block");
    }

    let fork = if config.fork_depth > 0 {
        Some(grow_fork(&chain, &main_line, &wallets, config))
    } else {
        None
    };

    let (best, utxos, best_height) = chain.best_tip();
    let summary = Summary {
        seed: config.seed,
        best_height,
        best_hash: best.hash().to_string(),
        retained_blocks: chain.with_chain(|c| c.block_count()),
        utxo_count: utxos.len(),
        total_value: utxos.total_value().context("total value overflow")?,
        submitted_payments: submitted,
        included_payments: included,
        fork,
        balances: wallets
            .iter()
            .map(|w| WalletBalance {
                owner: w.owner_key().to_string(),
                balance: utxos.balance_of(&w.owner_key()),
            })
            .collect(),
    };
    info!(
        best_height = summary.best_height,
        retained = summary.retained_blocks,
        included = summary.included_payments,
        "sim: finished"
    );
    Ok(summary)
}

/// Grow `fork_depth + 1` empty blocks from the main-line block `fork_depth`
/// below the tip, so the fork overtakes if every block is accepted.
fn grow_fork(
    chain: &SharedChain,
    main_line: &[Hash256],
    wallets: &[KeyPair],
    config: &SimConfig,
) -> ForkSummary {
    let depth = config.fork_depth;
    let mut summary = ForkSummary { depth, accepted: 0, rejected: None, became_best: false };

    let tip_index = main_line.len() - 1;
    let Some(base_index) = tip_index.checked_sub(depth as usize) else {
        warn!(depth, "sim: fork deeper than chain, skipping");
        summary.rejected = Some("fork deeper than chain".into());
        return summary;
    };

    let fork_miner: OwnerKey = wallets[WALLETS - 1].owner_key();
    let mut parent = main_line[base_index];
    // main_line[i] sits at height i + 1.
    let mut height = base_index as u64 + 1;
    for step in 0..=depth {
        height += 1;
        let block = Block {
            prev_hash: Some(parent),
            coinbase: Transaction::coinbase(config.chain.coinbase_reward, fork_miner, height),
            transactions: vec![],
            timestamp: 1_000_000 + step,
        };
        let hash = block.hash();
        match chain.try_add_block(block) {
            Ok(accepted) => {
                summary.accepted += 1;
                summary.became_best |= accepted.new_best;
                parent = hash;
            }
            Err(reason) => {
                warn!(height, %reason, "sim: fork block rejected");
                summary.rejected = Some(reason.to_string());
                break;
            }
        }
    }
    summary
}

/// Pay a random amount from one random output of a random wallet.
///
/// Returns `None` when the chosen wallet owns nothing in `utxos`.
fn random_payment(
    rng: &mut StdRng,
    wallets: &[KeyPair],
    utxos: &UtxoSet,
    nonce: u64,
) -> Option<Transaction> {
    let payer = wallets.choose(rng)?;
    let owned = utxos.outputs_owned_by(&payer.owner_key());
    let (outpoint, output) = owned.choose(rng)?;
    if output.value == 0 {
        return None;
    }
    let payee = wallets.choose(rng)?.owner_key();
    let amount = rng.gen_range(1..=output.value);

    let mut outputs = vec![TxOutput { value: amount, owner: payee }];
    if output.value > amount {
        outputs.push(TxOutput { value: output.value - amount, owner: payer.owner_key() });
    }
    let mut tx = Transaction {
        version: 1,
        inputs: vec![TxInput { previous_output: outpoint.clone(), signature: vec![] }],
        outputs,
        nonce,
    };
    crypto::sign_transaction_input(&mut tx, 0, payer).ok()?;
    Some(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(blocks: u64, fork_depth: u64) -> SimConfig {
        SimConfig {
            chain: ChainConfig::default(),
            blocks,
            fork_depth,
            payments_per_block: 3,
            seed: 7,
        }
    }

    #[test]
    fn value_matches_minted_coinbases() {
        let summary = run(&config(15, 0)).unwrap();
        assert_eq!(summary.best_height, 16);
        assert!(summary.total_value <= 25 * 16);
        assert!(summary.included_payments <= summary.submitted_payments);
        let held: u64 = summary.balances.iter().map(|b| b.balance).sum();
        assert_eq!(held, summary.total_value);
    }

    #[test]
    fn same_seed_same_outcome() {
        let a = run(&config(8, 2)).unwrap();
        let b = run(&config(8, 2)).unwrap();
        assert_eq!(a.best_hash, b.best_hash);
        assert_eq!(a.included_payments, b.included_payments);
    }

    #[test]
    fn shallow_fork_overtakes() {
        let summary = run(&config(12, 3)).unwrap();
        let fork = summary.fork.unwrap();
        assert_eq!(fork.accepted, 4);
        assert!(fork.became_best);
        assert!(fork.rejected.is_none());
        assert_eq!(summary.best_height, 14);
    }

    #[test]
    fn deep_fork_is_stale() {
        let summary = run(&config(20, 11)).unwrap();
        let fork = summary.fork.unwrap();
        assert_eq!(fork.accepted, 0);
        assert!(!fork.became_best);
        assert!(fork.rejected.is_some());
        assert_eq!(summary.best_height, 21);
    }

    #[test]
    fn summary_serializes() {
        let summary = run(&config(2, 0)).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["best_height"], 3);
        assert!(json["fork"].is_null());
    }
}
