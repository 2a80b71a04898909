pub mod ancestry;
pub mod block;
pub mod blockhash;
pub mod config;
pub mod errors;
pub mod network;
pub mod upgrades;

pub use rapids_math::{CompactTarget, Uint256, Uint320};

/// Accumulated chain work is kept in full 256 bit precision
pub type ChainWork = Uint256;
