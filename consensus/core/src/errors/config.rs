use crate::{network::NetworkId, upgrades::UpgradeIndex};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration: upgrade table position {0} holds {1}")]
    UpgradeOutOfPlace(usize, UpgradeIndex),

    #[error("Configuration: the base network upgrade must be always active")]
    BaseNetworkNotAlwaysActive,

    #[error("Configuration: {0} activates before {1}")]
    UpgradeOrder(UpgradeIndex, UpgradeIndex),

    #[error("Configuration: {0} binds an activation block hash but has no activation height")]
    ActivationHashOnSentinel(UpgradeIndex),

    #[error("Configuration: {0} target spacing must be positive")]
    ZeroTargetSpacing(&'static str),

    #[error("Configuration: target timespan {0} is shorter than the target spacing {1}")]
    TimespanBelowSpacing(u64, u64),

    #[error("Configuration: the averaging window of the windowed retarget must be positive")]
    ZeroAveragingWindow,

    #[error("Configuration: {0} = {1} is out of the supported range")]
    OutOfRange(&'static str, u64),

    #[error("Configuration: {0} must be positive")]
    ZeroParam(&'static str),

    #[error("Configuration: reward split sums to {0} basis points instead of 10000")]
    RewardSplitSum(u32),

    #[error("Configuration: consensus parameters of {0} cannot be overridden, only regtest allows it")]
    OverridesNotAllowed(NetworkId),

    #[error("Configuration: the base network upgrade cannot be patched")]
    BaseNetworkPatch,

    #[error("Configuration: override params parsing error: {0}")]
    OverrideParamsParse(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
