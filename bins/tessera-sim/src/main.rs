//! Tessera chain simulator.
//!
//! Mines a seeded sequence of blocks carrying random wallet payments,
//! optionally submits a competing fork, and prints a JSON summary of the
//! resulting best tip and ledger.

mod sim;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tessera_core::ChainConfig;
use tracing::info;

use crate::sim::SimConfig;

#[derive(Parser, Debug)]
#[command(
    name = "tessera-sim",
    version,
    about = "Simulate block production and fork handling on a Tessera ledger"
)]
struct Args {
    /// Number of main-line blocks to mine after genesis
    #[arg(long, default_value_t = 20)]
    blocks: u64,

    /// Depth below the tip to start a competing fork (0 disables)
    #[arg(long, default_value_t = 0)]
    fork_depth: u64,

    /// Random payments submitted before each block
    #[arg(long, default_value_t = 3)]
    payments_per_block: usize,

    /// JSON file overriding chain parameters (cutoff_age, coinbase_reward)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for wallets and payments
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text")]
    log_format: String,
}

impl Args {
    fn into_config(self) -> Result<(SimConfig, String, String)> {
        let chain = match &self.config {
            Some(path) => ChainConfig::load(path)
                .with_context(|| format!("loading chain config from {}", path.display()))?,
            None => ChainConfig::default(),
        };
        let config = SimConfig {
            chain,
            blocks: self.blocks,
            fork_depth: self.fork_depth,
            payments_per_block: self.payments_per_block,
            seed: self.seed,
        };
        Ok((config, self.log_level, self.log_format))
    }
}

fn main() -> Result<()> {
    let (config, log_level, log_format) = Args::parse().into_config()?;
    init_logging(&log_level, &log_format);

    info!(
        blocks = config.blocks,
        fork_depth = config.fork_depth,
        cutoff_age = config.chain.cutoff_age,
        seed = config.seed,
        "Tessera simulator v{}",
        env!("CARGO_PKG_VERSION")
    );

    let summary = sim::run(&config)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Initialize tracing with an env-overridable filter.
///
/// `format = "json"` emits structured JSON lines; anything else is text.
/// Logs go to stderr so the summary on stdout stays machine-readable.
fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
