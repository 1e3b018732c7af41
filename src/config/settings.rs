use once_cell::sync::Lazy;
use std::env;

/// Consensus and node parameters, resolved once at startup.
pub static GLOBAL_PARAMS: Lazy<ChainParams> = Lazy::new(ChainParams::new);

const DEFAULT_DATA_PATH: &str = "ledger_data/ledger.json";
const DATA_PATH_ENV: &str = "FORGECHAIN_DATA_PATH";

/// Chain parameters driving difficulty retargeting and block rewards.
///
/// Production values follow the reference network; tests construct their
/// own `ChainParams` with short intervals for deterministic retargets.
#[derive(Debug, Clone)]
pub struct ChainParams {
    /// Blocks between difficulty retargets
    pub retarget_interval: usize,
    /// Expected wall-clock seconds per retarget interval
    pub expected_timespan: u32,
    /// Compact bits for freshly created chains
    pub initial_bits: u32,
    /// Compact bits of the easiest-allowed target (the retarget ceiling)
    pub max_target_bits: u32,
    /// Coinbase reward in the smallest currency unit
    pub block_reward: u64,
    /// Message embedded in the genesis coinbase script
    pub genesis_message: String,
    /// Path of the JSON ledger file
    pub data_path: String,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainParams {
    pub fn new() -> ChainParams {
        let data_path =
            env::var(DATA_PATH_ENV).unwrap_or_else(|_| String::from(DEFAULT_DATA_PATH));

        ChainParams {
            retarget_interval: 2016,
            // Two weeks, matching the 2016-block cadence at 10 minutes per block
            expected_timespan: 14 * 24 * 60 * 60,
            // 0x1d00ffff takes far too long to search on one machine;
            // 0x1f00ffff keeps genesis creation in the seconds range
            initial_bits: 0x1f00ffff,
            max_target_bits: 0x1d00ffff,
            block_reward: 50_0000_0000,
            genesis_message: String::from("forgechain genesis"),
            data_path,
        }
    }
}
