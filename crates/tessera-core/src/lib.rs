//! # tessera-core
//! Ledger validation, epoch application, and bounded-depth chain tracking.
//!
//! - [`utxo::UtxoSet`]: unspent output set, one per retained block
//! - [`validation`]: per-transaction admissibility checks
//! - [`epoch`]: ordered batch application against a snapshot
//! - [`chain::ChainManager`]: block acceptance, best tip, pending pool
//! - [`shared::SharedChain`]: lock-guarded handle for concurrent callers

pub mod chain;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod epoch;
pub mod error;
pub mod mempool;
pub mod shared;
pub mod traits;
pub mod types;
pub mod utxo;
pub mod validation;

pub use chain::{BlockAccepted, ChainManager};
pub use config::ChainConfig;
pub use shared::SharedChain;
