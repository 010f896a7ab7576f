//! Error types for the Tessera ledger.
//!
//! Acceptance contracts stay boolean at the outer surface
//! ([`ChainManager::add_block`](crate::chain::ChainManager::add_block),
//! [`is_valid_transaction`](crate::validation::is_valid_transaction)); these
//! enums carry the reason alongside for callers that want diagnostics.
use thiserror::Error;

use crate::types::Hash256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("unknown UTXO: {0}")] UnknownUtxo(String),
    #[error("invalid signature on input {index}")] InvalidSignature { index: usize },
    #[error("duplicate input: {0}")] DuplicateInput(String),
    #[error("value overflow")] ValueOverflow,
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("transaction {index} ({txid}) rejected: {source}")]
    Rejected { index: usize, txid: Hash256, source: TransactionError },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockRejection {
    #[error("block has no parent")] MissingParent,
    #[error("invalid coinbase: {0}")] InvalidCoinbase(String),
    #[error("block already tracked")] DuplicateBlock,
    #[error("unknown parent: {0}")] UnknownParent(Hash256),
    #[error("stale parent at height {parent_height}: best {best_height}, cutoff {cutoff_age}")]
    StaleParent { parent_height: u64, best_height: u64, cutoff_age: u64 },
    #[error("invalid transactions: {0}")] InvalidTransactions(#[from] BatchError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("input index out of bounds: {index} >= {len}")]
    InputIndexOutOfBounds { index: usize, len: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config: {0}")] Io(#[from] std::io::Error),
    #[error("parsing config: {0}")] Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")] Invalid(String),
}
