//! Integration test suite for the Tessera ledger.
//!
//! Drives [`tessera_core::ChainManager`] through fork, cutoff and pool
//! scenarios, and checks ledger invariants under randomized inputs.

pub mod helpers;
