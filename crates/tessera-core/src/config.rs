//! Chain configuration.
//!
//! [`ChainConfig`] carries the two tunables of the ledger: the coinbase
//! reward and the fork cutoff depth. Defaults match the protocol constants;
//! values can be overridden programmatically or loaded from a JSON file
//! where every field is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COINBASE_REWARD, DEFAULT_CUTOFF_AGE};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainConfig {
    /// Maximum height lag of an eligible parent behind the best tip.
    pub cutoff_age: u64,
    /// Exact value every non-genesis coinbase must mint.
    pub coinbase_reward: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            cutoff_age: DEFAULT_CUTOFF_AGE,
            coinbase_reward: DEFAULT_COINBASE_REWARD,
        }
    }
}

impl ChainConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cutoff_age == 0 {
            return Err(ConfigError::Invalid("cutoff_age must be at least 1".into()));
        }
        if self.coinbase_reward == 0 {
            return Err(ConfigError::Invalid("coinbase_reward must be positive".into()));
        }
        Ok(())
    }
}
