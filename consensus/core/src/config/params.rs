pub use super::{
    constants::consensus::*,
    genesis::{GenesisBlock, GENESIS, REGTEST_GENESIS, TESTNET_GENESIS},
};
use crate::{
    blockhash::BlockHash,
    errors::config::{ConfigError, ConfigResult},
    network::NetworkId,
    upgrades::{ActivationHeight, UpgradeEntry, UpgradeIndex, UpgradeTable},
};
use rapids_math::Uint256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Division of the block reward between masternode, developer fund and staker, in basis points
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSplit {
    pub masternode: u32,
    pub dev: u32,
    pub stake: u32,
}

/// Amounts resulting from applying a [`RewardSplit`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardShares {
    pub masternode: u64,
    pub dev: u64,
    pub stake: u64,
}

impl RewardSplit {
    pub const fn new(masternode: u32, dev: u32, stake: u32) -> Self {
        Self { masternode, dev, stake }
    }

    /// Splits `amount` truncating the masternode and dev shares. The staker receives the remainder,
    /// so the shares always add up to `amount`.
    pub fn split(&self, amount: u64) -> RewardShares {
        let share = |bp: u32| ((amount as u128 * bp as u128) / BASIS_POINTS as u128) as u64;
        let masternode = share(self.masternode);
        let dev = share(self.dev);
        RewardShares { masternode, dev, stake: amount - masternode - dev }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let sum = self.masternode as u64 + self.dev as u64 + self.stake as u64;
        if sum != BASIS_POINTS as u64 {
            return Err(ConfigError::RewardSplitSum(sum.min(u32::MAX as u64) as u32));
        }
        Ok(())
    }
}

/// Spork signing keys with the rotation schedule from the old key to the current one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SporkKeys {
    pub current: &'static str,
    pub old: Option<&'static str>,
    /// Messages signed at or after this time must use the current key
    pub enforce_new_after: u64,
    /// Messages signed with the old key are rejected at or after this time
    pub reject_old_after: u64,
}

impl SporkKeys {
    pub fn accepts_old_key(&self, time: u64) -> bool {
        self.old.is_some() && time < self.reject_old_after
    }

    pub fn requires_new_key(&self, time: u64) -> bool {
        time >= self.enforce_new_after
    }
}

/// Parameters which were declared by earlier protocol versions and are kept for replaying historical
/// blocks only. No current rule reads them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacyParams {
    /// Averaging window declared alongside the first windowed retarget. The retarget itself always
    /// averaged [`Params::lwma_window`] blocks.
    pub declared_lwma_window: u64,
    /// Second generation stake spacing, `None` where it was never scheduled
    pub pos_target_spacing_v2: Option<u64>,
}

/// Regtest only adjustments, usually loaded from a JSON file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideParams {
    /// Activation heights of individual network upgrades
    pub upgrades: BTreeMap<UpgradeIndex, ActivationHeight>,

    pub allow_min_difficulty_blocks: Option<bool>,
    pub pow_target_spacing: Option<u64>,
    pub pow_target_timespan: Option<u64>,
    pub pos_target_spacing: Option<u64>,
    pub lwma_window: Option<u64>,
    pub time_slot_length: Option<u64>,
    pub last_pow_height: Option<u64>,
    pub coinbase_maturity: Option<u64>,
    pub stake_min_age: Option<u64>,
    pub stake_min_depth: Option<u64>,
}

impl OverrideParams {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|err| ConfigError::OverrideParamsParse(err.to_string()))
    }
}

/// Consensus parameters. Contains settings and configurations which are consensus-sensitive.
/// Changing one of these on a network node would exclude and prevent it from reaching consensus
/// with the other unmodified nodes.
#[derive(Clone, Debug)]
pub struct Params {
    pub net: NetworkId,
    pub genesis: GenesisBlock,
    /// Hardcoded `(height, hash)` pairs the chain must go through
    pub checkpoints: &'static [(u64, BlockHash)],

    /// Highest allowed proof of work target
    pub pow_limit: Uint256,
    /// Highest allowed proof of stake target
    pub pos_limit: Uint256,
    /// Highest allowed proof of stake target once [`UpgradeIndex::PosV2`] is active
    pub pos_limit_v2: Uint256,
    /// The legacy proof of work retarget keeps the previous target unchanged
    pub allow_min_difficulty_blocks: bool,

    /// Expected seconds between proof of work blocks
    pub pow_target_spacing: u64,
    /// Retarget timespan of the legacy algorithm (seconds)
    pub pow_target_timespan: u64,
    /// Expected seconds between proof of stake blocks, also the target spacing of the windowed retarget
    pub pos_target_spacing: u64,
    /// Number of blocks averaged by the windowed retarget
    pub lwma_window: u64,
    /// PoS v2 block times must be a multiple of this (seconds)
    pub time_slot_length: u64,
    /// Tolerated seconds a proof of work block time may be ahead of the adjusted time
    pub future_time_drift_pow: u64,
    /// Tolerated seconds a proof of stake block time may be ahead of the adjusted time
    pub future_time_drift_pos: u64,

    pub coinbase_maturity: u64,
    /// Minimum age (seconds) of a staked output before the [`UpgradeIndex::V3_4`] upgrade
    pub stake_min_age: u64,
    /// Minimum depth (blocks) of a staked output from the [`UpgradeIndex::V3_4`] upgrade on
    pub stake_min_depth: u64,

    pub max_money: u64,
    pub halving_interval: u64,
    pub premine: u64,
    /// Base block reward before any halving
    pub block_reward: u64,
    pub reward_split: RewardSplit,

    pub spork_keys: SporkKeys,

    /// Height of the last block which may be proof of work
    pub last_pow_height: u64,

    pub legacy: LegacyParams,
    pub upgrades: UpgradeTable,
}

impl Params {
    #[inline]
    #[must_use]
    pub fn is_upgrade_active(&self, index: UpgradeIndex, height: u64) -> bool {
        self.upgrades.is_active(index, height)
    }

    /// The proof of work or proof of stake ceiling. Choosing between the PoS eras is up to the caller,
    /// see [`Params::limit_for_height`].
    #[inline]
    #[must_use]
    pub fn active_limit(&self, is_proof_of_stake: bool) -> Uint256 {
        if is_proof_of_stake { self.pos_limit } else { self.pow_limit }
    }

    /// Like [`Params::active_limit`] with the PoS v2 ceiling applied once that upgrade is active
    #[must_use]
    pub fn limit_for_height(&self, is_proof_of_stake: bool, height: u64) -> Uint256 {
        if is_proof_of_stake && self.is_upgrade_active(UpgradeIndex::PosV2, height) {
            self.pos_limit_v2
        } else {
            self.active_limit(is_proof_of_stake)
        }
    }

    /// Target spacing of the given proof type
    #[inline]
    pub fn target_spacing(&self, is_proof_of_stake: bool) -> u64 {
        if is_proof_of_stake { self.pos_target_spacing } else { self.pow_target_spacing }
    }

    /// A block at exactly the activation height of an upgrade which binds a hash must carry that hash.
    /// Any other height or upgrade passes.
    pub fn check_activation_block(&self, index: UpgradeIndex, height: u64, hash: &BlockHash) -> bool {
        let entry = self.upgrades.entry(index);
        match entry.activation_hash {
            Some(expected) if entry.activation.height() == height => expected == *hash,
            _ => true,
        }
    }

    /// Moves the activation height of a single upgrade. Only regtest may be patched, and never its base network entry.
    pub fn update_network_upgrade(&mut self, index: UpgradeIndex, activation: ActivationHeight) -> ConfigResult<()> {
        if !self.net.is_regtest() {
            return Err(ConfigError::OverridesNotAllowed(self.net));
        }
        if index == UpgradeIndex::BaseNetwork {
            return Err(ConfigError::BaseNetworkPatch);
        }
        let mut upgrades = self.upgrades.clone();
        upgrades.set_activation(index, activation);
        upgrades.validate()?;
        self.upgrades = upgrades;
        Ok(())
    }

    /// Unknown heights pass
    pub fn check_checkpoint(&self, height: u64, hash: &BlockHash) -> bool {
        self.checkpoints.iter().find(|(h, _)| *h == height).is_none_or(|(_, expected)| expected == hash)
    }

    pub fn last_checkpoint_height(&self) -> Option<u64> {
        self.checkpoints.iter().map(|(h, _)| *h).max()
    }

    /// Whether a block at `height` may still be proof of work
    #[inline]
    pub fn is_pow_phase(&self, height: u64) -> bool {
        height <= self.last_pow_height
    }

    pub fn max_future_block_time(&self, adjusted_time: u64, is_proof_of_stake: bool) -> u64 {
        let drift = if is_proof_of_stake { self.future_time_drift_pos } else { self.future_time_drift_pow };
        adjusted_time.saturating_add(drift)
    }

    #[inline]
    pub fn is_valid_block_time_slot(&self, time: u64) -> bool {
        time % self.time_slot_length == 0
    }

    #[inline]
    pub fn time_slot_floor(&self, time: u64) -> u64 {
        time - time % self.time_slot_length
    }

    /// Before [`UpgradeIndex::V3_4`] a staked output must be `stake_min_age` seconds old, afterwards
    /// `stake_min_depth` blocks deep
    pub fn has_stake_min_age_or_depth(&self, context_height: u64, context_time: u64, utxo_height: u64, utxo_time: u64) -> bool {
        if !self.is_upgrade_active(UpgradeIndex::V3_4, context_height) {
            return utxo_time.saturating_add(self.stake_min_age) <= context_time;
        }
        context_height.saturating_sub(utxo_height) >= self.stake_min_depth
    }

    /// Base block reward, halved every `halving_interval` blocks
    pub fn block_subsidy(&self, height: u64) -> u64 {
        match height / self.halving_interval {
            halvings if halvings >= u64::BITS as u64 => 0,
            halvings => self.block_reward >> halvings,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.upgrades.validate()?;

        for (name, spacing) in [("proof of work", self.pow_target_spacing), ("proof of stake", self.pos_target_spacing)] {
            if spacing == 0 {
                return Err(ConfigError::ZeroTargetSpacing(name));
            }
        }
        // The legacy retarget divides the timespan by the spacing of either proof type
        for spacing in [self.pow_target_spacing, self.pos_target_spacing] {
            if self.pow_target_timespan < spacing {
                return Err(ConfigError::TimespanBelowSpacing(self.pow_target_timespan, spacing));
            }
        }
        for (name, value) in [
            ("pow_target_spacing", self.pow_target_spacing),
            ("pos_target_spacing", self.pos_target_spacing),
            ("pow_target_timespan", self.pow_target_timespan),
        ] {
            if value > MAX_TIMING_PARAM {
                return Err(ConfigError::OutOfRange(name, value));
            }
        }
        if self.lwma_window == 0 {
            return Err(ConfigError::ZeroAveragingWindow);
        }
        if self.lwma_window > MAX_AVERAGING_WINDOW {
            return Err(ConfigError::OutOfRange("lwma_window", self.lwma_window));
        }
        if self.time_slot_length == 0 {
            return Err(ConfigError::ZeroParam("time_slot_length"));
        }
        if self.halving_interval == 0 {
            return Err(ConfigError::ZeroParam("halving_interval"));
        }
        for (name, limit) in [("pow_limit", self.pow_limit), ("pos_limit", self.pos_limit), ("pos_limit_v2", self.pos_limit_v2)] {
            if limit.is_zero() {
                return Err(ConfigError::ZeroParam(name));
            }
        }
        self.reward_split.validate()
    }

    /// Applies regtest overrides and validates the outcome
    pub fn override_params(self, overrides: OverrideParams) -> ConfigResult<Self> {
        if !self.net.is_regtest() {
            return Err(ConfigError::OverridesNotAllowed(self.net));
        }
        let mut params = Self {
            allow_min_difficulty_blocks: overrides.allow_min_difficulty_blocks.unwrap_or(self.allow_min_difficulty_blocks),
            pow_target_spacing: overrides.pow_target_spacing.unwrap_or(self.pow_target_spacing),
            pow_target_timespan: overrides.pow_target_timespan.unwrap_or(self.pow_target_timespan),
            pos_target_spacing: overrides.pos_target_spacing.unwrap_or(self.pos_target_spacing),
            lwma_window: overrides.lwma_window.unwrap_or(self.lwma_window),
            time_slot_length: overrides.time_slot_length.unwrap_or(self.time_slot_length),
            last_pow_height: overrides.last_pow_height.unwrap_or(self.last_pow_height),
            coinbase_maturity: overrides.coinbase_maturity.unwrap_or(self.coinbase_maturity),
            stake_min_age: overrides.stake_min_age.unwrap_or(self.stake_min_age),
            stake_min_depth: overrides.stake_min_depth.unwrap_or(self.stake_min_depth),
            ..self
        };
        // The table is only checked once complete, so overrides may move related upgrades together
        for (index, activation) in overrides.upgrades {
            if index == UpgradeIndex::BaseNetwork {
                return Err(ConfigError::BaseNetworkPatch);
            }
            params.upgrades.set_activation(index, activation);
        }
        params.validate()?;
        Ok(params)
    }
}

impl From<NetworkId> for Params {
    fn from(value: NetworkId) -> Self {
        match value {
            NetworkId::Mainnet => MAINNET_PARAMS,
            NetworkId::Testnet => TESTNET_PARAMS,
            NetworkId::Regtest => REGTEST_PARAMS,
        }
    }
}

const fn upgrade(index: UpgradeIndex, activation: ActivationHeight) -> UpgradeEntry {
    UpgradeEntry::new(index, activation)
}

const fn height(height: u64) -> ActivationHeight {
    ActivationHeight::new(height)
}

const ALWAYS: ActivationHeight = ActivationHeight::always();
const NEVER: ActivationHeight = ActivationHeight::never();

/// The windowed retarget applies to blocks above this height on every network
const LWMA_PROTOCOL_HEIGHT: u64 = 200;

const MAINNET_CHECKPOINTS: &[(u64, BlockHash)] =
    &[(0, BlockHash::from_hex_const("00000b444395e32c86230466900dba6483f9175cd385c1aa4456651a848900ed"))];

pub const MAINNET_PARAMS: Params = Params {
    net: NetworkId::Mainnet,
    genesis: GENESIS,
    checkpoints: MAINNET_CHECKPOINTS,

    pow_limit: POW_LIMIT,
    pos_limit: POS_LIMIT,
    pos_limit_v2: POS_LIMIT_V2,
    allow_min_difficulty_blocks: true,

    pow_target_spacing: 15,
    pow_target_timespan: 30 * 60,
    pos_target_spacing: 15,
    lwma_window: LWMA_WINDOW,
    time_slot_length: 15,
    future_time_drift_pow: 7200,
    future_time_drift_pos: 180,

    coinbase_maturity: 10,
    stake_min_age: 10 * 60,
    stake_min_depth: 60,

    max_money: 35_000_000 * COIN,
    halving_interval: 500_000,
    premine: 10_000_000 * COIN,
    // 0.445875 coins
    block_reward: 44_587_500,
    reward_split: RewardSplit::new(7000, 1000, 2000),

    spork_keys: SporkKeys {
        current: "02b1f75be7556ab096f2fd94378c153e6164435e76d29393e1e6dc422edb8c9135",
        old: Some("02f8564bbb59972e10fb297f55f401c6743dba1a0f864e526a25476984717f5856"),
        enforce_new_after: 1675572203,
        reject_old_after: 1675572200,
    },

    last_pow_height: 199,

    legacy: LegacyParams { declared_lwma_window: 8, pos_target_spacing_v2: None },

    upgrades: UpgradeTable::new([
        upgrade(UpgradeIndex::BaseNetwork, ALWAYS),
        upgrade(UpgradeIndex::TestDummy, NEVER),
        upgrade(UpgradeIndex::Pos, height(200)),
        upgrade(UpgradeIndex::PosV2, height(201)),
        upgrade(UpgradeIndex::Zerocoin, NEVER),
        upgrade(UpgradeIndex::ZerocoinV2, NEVER),
        upgrade(UpgradeIndex::Bip65, height(1)),
        upgrade(UpgradeIndex::ZerocoinPublic, NEVER),
        upgrade(UpgradeIndex::V3_4, height(201)),
        upgrade(UpgradeIndex::V4_0, height(202)),
        upgrade(UpgradeIndex::V5Dummy, NEVER),
        upgrade(UpgradeIndex::Lwma, height(LWMA_PROTOCOL_HEIGHT + 1)),
        upgrade(UpgradeIndex::LwmaJump, NEVER),
    ]),
};

pub const TESTNET_PARAMS: Params = Params {
    net: NetworkId::Testnet,
    genesis: TESTNET_GENESIS,
    checkpoints: &[],

    pow_limit: POW_LIMIT,
    pos_limit: POS_LIMIT,
    pos_limit_v2: POS_LIMIT_V2,
    allow_min_difficulty_blocks: true,

    pow_target_spacing: 15,
    pow_target_timespan: 3 * 60,
    pos_target_spacing: 15,
    lwma_window: LWMA_WINDOW,
    time_slot_length: 15,
    future_time_drift_pow: 7200,
    future_time_drift_pos: 180,

    coinbase_maturity: 10,
    stake_min_age: 5 * 60,
    stake_min_depth: 25,

    max_money: 35_000_000_000 * COIN,
    halving_interval: 500_000,
    premine: 10_000_000 * COIN,
    // 0.17835 coins
    block_reward: 17_835_000,
    reward_split: RewardSplit::new(1000, 7000, 2000),

    spork_keys: SporkKeys {
        current: "03c064d2dadca0c11d4f31bc9f1857b3b1a51289f3c8e2be6653f49951c53bf083",
        old: Some(
            "0457fe3e90da4bb4899ced14cbed073fb0174294975cb1b9e1a085990674117860a90912d9e91b83d8e2fff11716ed0e938a742e9862af37a6e545318e1ccd7472",
        ),
        enforce_new_after: 1669797609,
        reject_old_after: 1669797309,
    },

    last_pow_height: 199,

    legacy: LegacyParams { declared_lwma_window: 8, pos_target_spacing_v2: Some(30) },

    upgrades: UpgradeTable::new([
        upgrade(UpgradeIndex::BaseNetwork, ALWAYS),
        upgrade(UpgradeIndex::TestDummy, NEVER),
        upgrade(UpgradeIndex::Pos, height(200)),
        upgrade(UpgradeIndex::PosV2, height(201)),
        upgrade(UpgradeIndex::Zerocoin, NEVER),
        upgrade(UpgradeIndex::ZerocoinV2, NEVER),
        upgrade(UpgradeIndex::Bip65, ALWAYS),
        upgrade(UpgradeIndex::ZerocoinPublic, NEVER),
        upgrade(UpgradeIndex::V3_4, height(201)),
        upgrade(UpgradeIndex::V4_0, height(202)),
        upgrade(UpgradeIndex::V5Dummy, NEVER),
        upgrade(UpgradeIndex::Lwma, height(LWMA_PROTOCOL_HEIGHT + 1)),
        upgrade(UpgradeIndex::LwmaJump, NEVER),
    ]),
};

pub const REGTEST_PARAMS: Params = Params {
    net: NetworkId::Regtest,
    genesis: REGTEST_GENESIS,
    checkpoints: &[],

    pow_limit: POS_LIMIT_V2,
    pos_limit: POS_LIMIT_V2,
    pos_limit_v2: POS_LIMIT_V2,
    allow_min_difficulty_blocks: true,

    pow_target_spacing: 60,
    pow_target_timespan: 30 * 60,
    pos_target_spacing: 15,
    lwma_window: LWMA_WINDOW,
    time_slot_length: 15,
    future_time_drift_pow: 7200,
    future_time_drift_pos: 180,

    coinbase_maturity: 1,
    stake_min_age: 0,
    stake_min_depth: 2,

    max_money: 35_000_000_000 * COIN,
    halving_interval: 500_000,
    premine: 10_000_000 * COIN,
    block_reward: 17_835_000,
    reward_split: RewardSplit::new(1000, 7000, 2000),

    spork_keys: SporkKeys {
        current: "043969b1b0e6f327de37f297a015d37e2235eaaeeb3933deecd8162c075cee0207b13537618bde640879606001a8136091c62ec272dd0133424a178704e6e75bb7",
        old: None,
        enforce_new_after: 0,
        reject_old_after: 0,
    },

    last_pow_height: 250,

    legacy: LegacyParams { declared_lwma_window: 8, pos_target_spacing_v2: Some(30) },

    upgrades: UpgradeTable::new([
        upgrade(UpgradeIndex::BaseNetwork, ALWAYS),
        upgrade(UpgradeIndex::TestDummy, NEVER),
        upgrade(UpgradeIndex::Pos, height(251)),
        upgrade(UpgradeIndex::PosV2, height(251)),
        upgrade(UpgradeIndex::Zerocoin, height(300)),
        upgrade(UpgradeIndex::ZerocoinV2, height(300)),
        upgrade(UpgradeIndex::Bip65, ALWAYS),
        upgrade(UpgradeIndex::ZerocoinPublic, height(400)),
        upgrade(UpgradeIndex::V3_4, height(251)),
        upgrade(UpgradeIndex::V4_0, ALWAYS),
        upgrade(UpgradeIndex::V5Dummy, height(300)),
        upgrade(UpgradeIndex::Lwma, height(LWMA_PROTOCOL_HEIGHT + 1)),
        upgrade(UpgradeIndex::LwmaJump, NEVER),
    ]),
};

#[cfg(test)]
mod tests {
    use super::*;

    const NO_HASH: BlockHash = BlockHash::from_bytes([0u8; 32]);

    #[test]
    fn test_network_params_are_valid() {
        for net in NetworkId::iter() {
            let params = Params::from(net);
            assert_eq!(params.net, net);
            params.validate().unwrap();
        }
    }

    #[test]
    fn test_limits() {
        let params = MAINNET_PARAMS;
        assert_eq!(params.active_limit(false), POW_LIMIT);
        assert_eq!(params.active_limit(true), POS_LIMIT);
        assert_eq!(params.limit_for_height(true, 200), POS_LIMIT);
        assert_eq!(params.limit_for_height(true, 201), POS_LIMIT_V2);
        assert_eq!(params.limit_for_height(false, 201), POW_LIMIT);
        assert_eq!(REGTEST_PARAMS.active_limit(false), Uint256::MAX >> 20);
    }

    #[test]
    fn test_reward_split() {
        struct Test {
            name: &'static str,
            split: RewardSplit,
            amount: u64,
            expected: RewardShares,
        }

        let tests = [
            Test {
                name: "mainnet block reward",
                split: MAINNET_PARAMS.reward_split,
                amount: MAINNET_PARAMS.block_reward,
                expected: RewardShares { masternode: 31_211_250, dev: 4_458_750, stake: 8_917_500 },
            },
            Test {
                name: "remainder goes to the staker",
                split: RewardSplit::new(3333, 3333, 3334),
                amount: 10,
                expected: RewardShares { masternode: 3, dev: 3, stake: 4 },
            },
            Test {
                name: "zero amount",
                split: TESTNET_PARAMS.reward_split,
                amount: 0,
                expected: RewardShares { masternode: 0, dev: 0, stake: 0 },
            },
        ];

        for test in tests {
            assert_eq!(test.split.split(test.amount), test.expected, "{}", test.name);
        }
        assert_eq!(RewardSplit::new(7000, 1000, 1000).validate(), Err(ConfigError::RewardSplitSum(9000)));
    }

    #[test]
    fn test_block_subsidy() {
        let params = MAINNET_PARAMS;
        assert_eq!(params.block_subsidy(0), 44_587_500);
        assert_eq!(params.block_subsidy(499_999), 44_587_500);
        assert_eq!(params.block_subsidy(500_000), 22_293_750);
        assert_eq!(params.block_subsidy(1_000_000), 11_146_875);
        assert_eq!(params.block_subsidy(64 * 500_000), 0);
        assert_eq!(params.block_subsidy(u64::MAX), 0);
    }

    #[test]
    fn test_activation_block_and_checkpoints() {
        let mut params = REGTEST_PARAMS;
        let bound = BlockHash::from_bytes([7; 32]);
        params.upgrades = {
            let mut entries = [UpgradeEntry::new(UpgradeIndex::BaseNetwork, ALWAYS); UpgradeIndex::COUNT];
            for (entry, index) in entries.iter_mut().zip(UpgradeIndex::iter()) {
                *entry = *params.upgrades.entry(index);
            }
            entries[UpgradeIndex::V3_4.position()] = UpgradeEntry::with_hash(UpgradeIndex::V3_4, height(251), bound);
            UpgradeTable::new(entries)
        };
        params.validate().unwrap();
        assert!(params.check_activation_block(UpgradeIndex::V3_4, 251, &bound));
        assert!(!params.check_activation_block(UpgradeIndex::V3_4, 251, &NO_HASH));
        assert!(params.check_activation_block(UpgradeIndex::V3_4, 252, &NO_HASH));
        assert!(params.check_activation_block(UpgradeIndex::Pos, 251, &NO_HASH));

        let genesis_hash = MAINNET_PARAMS.genesis.hash.unwrap();
        assert!(MAINNET_PARAMS.check_checkpoint(0, &genesis_hash));
        assert!(!MAINNET_PARAMS.check_checkpoint(0, &NO_HASH));
        assert!(MAINNET_PARAMS.check_checkpoint(1, &NO_HASH));
        assert_eq!(MAINNET_PARAMS.last_checkpoint_height(), Some(0));
        assert_eq!(TESTNET_PARAMS.last_checkpoint_height(), None);
    }

    #[test]
    fn test_update_network_upgrade() {
        let mut params = REGTEST_PARAMS;
        params.update_network_upgrade(UpgradeIndex::LwmaJump, height(260)).unwrap();
        assert!(params.is_upgrade_active(UpgradeIndex::LwmaJump, 260));
        assert!(!params.is_upgrade_active(UpgradeIndex::LwmaJump, 259));

        assert_eq!(params.update_network_upgrade(UpgradeIndex::BaseNetwork, height(5)), Err(ConfigError::BaseNetworkPatch));
        // A rejected patch leaves the table untouched
        assert_eq!(
            params.update_network_upgrade(UpgradeIndex::Lwma, height(300)),
            Err(ConfigError::UpgradeOrder(UpgradeIndex::LwmaJump, UpgradeIndex::Lwma))
        );
        assert!(params.is_upgrade_active(UpgradeIndex::Lwma, 201));

        let mut mainnet = MAINNET_PARAMS;
        assert_eq!(
            mainnet.update_network_upgrade(UpgradeIndex::LwmaJump, height(260)),
            Err(ConfigError::OverridesNotAllowed(NetworkId::Mainnet))
        );
    }

    #[test]
    fn test_time_and_stake_rules() {
        let params = MAINNET_PARAMS;
        assert!(params.is_valid_block_time_slot(1679198505));
        assert!(!params.is_valid_block_time_slot(1679198507));
        assert_eq!(params.time_slot_floor(1679198507), 1679198505);
        assert_eq!(params.max_future_block_time(1000, false), 8200);
        assert_eq!(params.max_future_block_time(1000, true), 1180);
        assert!(params.is_pow_phase(199));
        assert!(!params.is_pow_phase(200));

        // Age rule before v3.4
        assert!(params.has_stake_min_age_or_depth(200, 10_600, 199, 10_000));
        assert!(!params.has_stake_min_age_or_depth(200, 10_599, 199, 10_000));
        // Depth rule from v3.4 on, regardless of age
        assert!(params.has_stake_min_age_or_depth(261, 10_001, 201, 10_000));
        assert!(!params.has_stake_min_age_or_depth(260, 99_999, 201, 10_000));
    }

    #[test]
    fn test_spork_keys() {
        let keys = MAINNET_PARAMS.spork_keys;
        assert!(keys.accepts_old_key(1675572199));
        assert!(!keys.accepts_old_key(1675572200));
        assert!(!keys.requires_new_key(1675572202));
        assert!(keys.requires_new_key(1675572203));
        let regtest = REGTEST_PARAMS.spork_keys;
        assert!(!regtest.accepts_old_key(0));
        assert!(regtest.requires_new_key(0));
    }

    #[test]
    fn test_override_params() {
        let json = r#"{ "upgrades": { "lwma": 50, "lwma_jump": 80 }, "pos_target_spacing": 30, "lwma_window": 10 }"#;
        let overrides = OverrideParams::from_json(json).unwrap();
        let params = REGTEST_PARAMS.override_params(overrides.clone()).unwrap();
        assert!(params.is_upgrade_active(UpgradeIndex::Lwma, 50));
        assert!(params.is_upgrade_active(UpgradeIndex::LwmaJump, 80));
        assert_eq!(params.pos_target_spacing, 30);
        assert_eq!(params.lwma_window, 10);
        assert_eq!(params.pow_target_spacing, REGTEST_PARAMS.pow_target_spacing);

        assert_eq!(TESTNET_PARAMS.override_params(overrides).unwrap_err(), ConfigError::OverridesNotAllowed(NetworkId::Testnet));
        assert!(matches!(OverrideParams::from_json("{ \"lwma_window\": -1 }"), Err(ConfigError::OverrideParamsParse(_))));
        let zero_window = OverrideParams { lwma_window: Some(0), ..Default::default() };
        assert_eq!(REGTEST_PARAMS.override_params(zero_window).unwrap_err(), ConfigError::ZeroAveragingWindow);
    }

    #[test]
    fn test_override_params_validate_the_final_table() {
        // Moving PosV2 first would put it before Pos in an intermediate table
        let overrides = OverrideParams::from_json(r#"{ "upgrades": { "pos": 300, "pos_v2": 300 } }"#).unwrap();
        let params = REGTEST_PARAMS.override_params(overrides).unwrap();
        assert!(!params.is_upgrade_active(UpgradeIndex::Pos, 299));
        assert!(params.is_upgrade_active(UpgradeIndex::Pos, 300));
        assert!(params.is_upgrade_active(UpgradeIndex::PosV2, 300));

        let reversed = OverrideParams::from_json(r#"{ "upgrades": { "pos": 300, "pos_v2": 299 } }"#).unwrap();
        assert_eq!(
            REGTEST_PARAMS.override_params(reversed).unwrap_err(),
            ConfigError::UpgradeOrder(UpgradeIndex::PosV2, UpgradeIndex::Pos)
        );
        let base = OverrideParams::from_json(r#"{ "upgrades": { "base_network": 5 } }"#).unwrap();
        assert_eq!(REGTEST_PARAMS.override_params(base).unwrap_err(), ConfigError::BaseNetworkPatch);
    }
}
