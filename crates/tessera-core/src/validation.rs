//! Transaction admissibility against a ledger snapshot.
//!
//! [`validate_transaction`] runs every check and reports the first failure;
//! [`is_valid_transaction`] collapses that to the accept/reject boolean the
//! ledger actually decides on. Neither mutates the snapshot.
//!
//! Checks, in evaluation order:
//! 1. every input references an outpoint present in the snapshot
//! 2. every input carries a valid signature by the referenced output's owner
//! 3. no outpoint is claimed twice by the same transaction
//! 4. amounts are non-negative (by type) and sums do not overflow
//! 5. total input value covers total output value
//!
//! A transaction with no inputs gets no special treatment: it passes only if
//! it creates no value. Minting is handled by the coinbase rule at block
//! level.

use std::collections::HashSet;

use crate::crypto;
use crate::error::TransactionError;
use crate::traits::SignatureVerifier;
use crate::types::{Hash256, Transaction};
use crate::utxo::UtxoSet;

/// Summary of a successfully validated transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransaction {
    pub txid: Hash256,
    /// Total value of all spent inputs.
    pub total_input: u64,
    /// Total value of all created outputs.
    pub total_output: u64,
    /// Value destroyed by this transaction (`total_input - total_output`).
    pub fee: u64,
}

/// Validate a transaction against `utxos`.
pub fn validate_transaction<V>(
    utxos: &UtxoSet,
    tx: &Transaction,
    verifier: &V,
) -> Result<ValidatedTransaction, TransactionError>
where
    V: SignatureVerifier + ?Sized,
{
    let mut claimed = HashSet::with_capacity(tx.inputs.len());
    let mut total_input: u64 = 0;

    for (i, input) in tx.inputs.iter().enumerate() {
        let utxo = utxos.get(&input.previous_output).ok_or_else(|| {
            TransactionError::UnknownUtxo(input.previous_output.to_string())
        })?;

        if !crypto::verify_transaction_input(verifier, tx, i, &utxo.owner) {
            return Err(TransactionError::InvalidSignature { index: i });
        }

        if !claimed.insert(&input.previous_output) {
            return Err(TransactionError::DuplicateInput(
                input.previous_output.to_string(),
            ));
        }

        total_input = total_input
            .checked_add(utxo.value)
            .ok_or(TransactionError::ValueOverflow)?;
    }

    let total_output = tx
        .total_output_value()
        .ok_or(TransactionError::ValueOverflow)?;

    if total_input < total_output {
        return Err(TransactionError::InsufficientFunds {
            have: total_input,
            need: total_output,
        });
    }

    Ok(ValidatedTransaction {
        txid: tx.txid(),
        total_input,
        total_output,
        fee: total_input - total_output,
    })
}

/// Boolean admissibility: `true` iff [`validate_transaction`] succeeds.
pub fn is_valid_transaction<V>(utxos: &UtxoSet, tx: &Transaction, verifier: &V) -> bool
where
    V: SignatureVerifier + ?Sized,
{
    validate_transaction(utxos, tx, verifier).is_ok()
}
