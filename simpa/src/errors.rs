use rapids_consensus::errors::RuleError;
use rapids_consensus_core::errors::{config::ConfigError, difficulty::DifficultyError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("generated block was rejected: {0}")]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Difficulty(#[from] DifficultyError),

    #[error("solve time distribution: {0}")]
    Distribution(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = std::result::Result<T, SimError>;
