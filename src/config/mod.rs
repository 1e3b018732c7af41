//! Configuration management
//!
//! Chain parameters (retarget cadence, initial difficulty, block reward)
//! and the node's data path.

pub mod settings;

pub use settings::{ChainParams, GLOBAL_PARAMS};
