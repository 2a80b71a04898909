use crate::blockhash::BlockHash;
use rapids_math::{TargetError, Uint256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PowError {
    #[error("invalid block target: {0}")]
    InvalidTarget(#[from] TargetError),

    #[error("block target {0:#x} is above the network limit {1:#x}")]
    TargetAboveLimit(Uint256, Uint256),

    #[error("block hash {0} is above the target {1:#x}")]
    HashAboveTarget(BlockHash, Uint256),
}

pub type PowResult<T> = std::result::Result<T, PowError>;
