use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DifficultyError {
    #[error("chain index has no ancestor at height {0} although the tip is above it")]
    MissingAncestor(u64),
}

pub type DifficultyResult<T> = std::result::Result<T, DifficultyError>;
