//! Ordered application of a transaction batch to a ledger snapshot.
//!
//! [`apply_transactions`] walks the batch once, in input order. Each
//! transaction is validated against the set *as mutated by its accepted
//! predecessors*, so a later transaction may spend an output created earlier
//! in the same batch, and two transactions claiming the same outpoint can
//! never both be accepted. Rejected transactions are skipped, never retried.
//!
//! Two caller modes are layered on top:
//! - [`apply_best_effort`] keeps whatever subset applies (genesis bootstrap,
//!   block templates drawn from the pending pool).
//! - [`apply_strict`] is all-or-nothing (block acceptance) and additionally
//!   requires each transaction to be valid against the original snapshot.

use tracing::debug;

use crate::error::{BatchError, TransactionError};
use crate::traits::SignatureVerifier;
use crate::types::{Hash256, OutPoint, Transaction};
use crate::utxo::UtxoSet;
use crate::validation::validate_transaction;

/// A transaction dropped from a batch, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTransaction {
    /// Position in the submitted batch.
    pub index: usize,
    pub txid: Hash256,
    pub reason: TransactionError,
}

/// Result of applying a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochOutcome {
    /// Accepted transactions, in the order they were applied.
    pub accepted: Vec<Transaction>,
    /// Diagnostic record of dropped transactions. Never affects outcomes.
    pub rejected: Vec<RejectedTransaction>,
}

impl EpochOutcome {
    /// Whether every transaction of the batch was accepted.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Apply `txs` to `utxos` in place.
///
/// For each valid transaction: remove every referenced outpoint, then add
/// `(txid, position)` for each output.
pub fn apply_transactions<V>(utxos: &mut UtxoSet, txs: &[Transaction], verifier: &V) -> EpochOutcome
where
    V: SignatureVerifier + ?Sized,
{
    let mut outcome = EpochOutcome {
        accepted: Vec::with_capacity(txs.len()),
        rejected: Vec::new(),
    };

    for (index, tx) in txs.iter().enumerate() {
        let validated = match validate_transaction(utxos, tx, verifier) {
            Ok(v) => v,
            Err(reason) => {
                let txid = tx.txid();
                debug!(index, txid = %txid.short(), %reason, "epoch: transaction rejected");
                outcome.rejected.push(RejectedTransaction { index, txid, reason });
                continue;
            }
        };

        for input in &tx.inputs {
            utxos.remove(&input.previous_output);
        }
        for (position, output) in tx.outputs.iter().enumerate() {
            utxos.add(
                OutPoint {
                    txid: validated.txid,
                    index: position as u64,
                },
                output.clone(),
            );
        }
        outcome.accepted.push(tx.clone());
    }

    outcome
}

/// Apply `txs` to a copy of `snapshot`, keeping whatever subset is valid.
pub fn apply_best_effort<V>(
    snapshot: &UtxoSet,
    txs: &[Transaction],
    verifier: &V,
) -> (EpochOutcome, UtxoSet)
where
    V: SignatureVerifier + ?Sized,
{
    let mut next = snapshot.clone();
    let outcome = apply_transactions(&mut next, txs, verifier);
    (outcome, next)
}

/// Apply `txs` to a copy of `snapshot`, requiring every transaction to apply.
///
/// Each transaction must first be valid on its own against the unmodified
/// `snapshot`, so a batch cannot spend outputs created inside itself. The
/// batch is then applied in order, which still catches two transactions
/// claiming the same outpoint. On any rejection the copy is discarded and
/// the first rejection returned; no partial result escapes.
pub fn apply_strict<V>(
    snapshot: &UtxoSet,
    txs: &[Transaction],
    verifier: &V,
) -> Result<(Vec<Transaction>, UtxoSet), BatchError>
where
    V: SignatureVerifier + ?Sized,
{
    for (index, tx) in txs.iter().enumerate() {
        if let Err(source) = validate_transaction(snapshot, tx, verifier) {
            return Err(BatchError::Rejected { index, txid: tx.txid(), source });
        }
    }

    let (outcome, next) = apply_best_effort(snapshot, txs, verifier);
    if let Some(first) = outcome.rejected.into_iter().next() {
        return Err(BatchError::Rejected {
            index: first.index,
            txid: first.txid,
            source: first.reason,
        });
    }
    Ok((outcome.accepted, next))
}
