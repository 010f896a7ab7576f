//! Protocol constants. All monetary values are `u64` base units.

/// Amount minted by every block's coinbase output.
///
/// # Examples
///
/// ```
/// use tessera_core::constants::DEFAULT_COINBASE_REWARD;
/// assert_eq!(DEFAULT_COINBASE_REWARD, 25);
/// ```
pub const DEFAULT_COINBASE_REWARD: u64 = 25;

/// Maximum height lag a parent may have behind the best tip and still
/// accept children. A parent at exactly `best_height - DEFAULT_CUTOFF_AGE`
/// is still eligible.
pub const DEFAULT_CUTOFF_AGE: u64 = 10;

/// Height assigned to the genesis block.
pub const GENESIS_HEIGHT: u64 = 1;

/// Transaction format version written by the builders in this crate.
pub const TX_VERSION: u64 = 1;
