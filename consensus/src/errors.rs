use rapids_consensus_core::{
    blockhash::BlockHash,
    errors::{difficulty::DifficultyError, pow::PowError},
    upgrades::UpgradeIndex,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("block height {0} does not follow the tip, expected {1}")]
    UnexpectedHeight(u64, u64),

    #[error("block {0} has bits {1:#010x} but {2:#010x} are required")]
    UnexpectedDifficulty(BlockHash, u32, u32),

    #[error(transparent)]
    InvalidProofOfWork(#[from] PowError),

    #[error(transparent)]
    Difficulty(#[from] DifficultyError),

    #[error("the block timestamp is too much in the future: block timestamp is {0} but maximum timestamp allowed is {1}")]
    TimeTooMuchInTheFuture(u64, u64),

    #[error("block timestamp {0} is not aligned to a time slot")]
    InvalidTimeSlot(u64),

    #[error("proof of work block at height {0} is past the last proof of work height")]
    ProofOfWorkPhaseEnded(u64),

    #[error("proof of stake block at height {0} before proof of stake activation")]
    ProofOfStakeNotActive(u64),

    #[error("block {1} at height {0} contradicts a checkpoint")]
    CheckpointMismatch(u64, BlockHash),

    #[error("block {1} does not match the activation block of {0}")]
    ActivationBlockMismatch(UpgradeIndex, BlockHash),
}

pub type BlockProcessResult<T> = std::result::Result<T, RuleError>;
