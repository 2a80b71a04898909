use crate::{
    blockhash::BlockHash,
    errors::config::{ConfigError, ConfigResult},
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Block height at which a network upgrade becomes active, with the two sentinels
/// [`ActivationHeight::always`] (active since genesis) and [`ActivationHeight::never`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationHeight(u64);

impl ActivationHeight {
    const NEVER: u64 = u64::MAX;
    const ALWAYS: u64 = 0;

    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    pub const fn never() -> Self {
        Self(Self::NEVER)
    }

    pub const fn always() -> Self {
        Self(Self::ALWAYS)
    }

    /// Returns the raw activation height. Activation checks should always go through `self.is_active(..)`
    pub fn height(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn is_active(self, height: u64) -> bool {
        !self.is_never() && height >= self.0
    }

    pub fn is_always(self) -> bool {
        self.0 == Self::ALWAYS
    }

    pub fn is_never(self) -> bool {
        self.0 == Self::NEVER
    }
}

impl Display for ActivationHeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Self::ALWAYS => f.write_str("always"),
            Self::NEVER => f.write_str("never"),
            height => write!(f, "{}", height),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeIndex {
    BaseNetwork,
    TestDummy,
    Pos,
    PosV2,
    Zerocoin,
    ZerocoinV2,
    Bip65,
    ZerocoinPublic,
    V3_4,
    V4_0,
    V5Dummy,
    /// Windowed, linearly weighted difficulty retarget
    Lwma,
    /// Faster downward adjustment on top of [`UpgradeIndex::Lwma`] when blocks come in too quickly
    LwmaJump,
}

impl UpgradeIndex {
    pub const COUNT: usize = 13;

    pub fn iter() -> impl Iterator<Item = Self> {
        static INDICES: [UpgradeIndex; UpgradeIndex::COUNT] = [
            UpgradeIndex::BaseNetwork,
            UpgradeIndex::TestDummy,
            UpgradeIndex::Pos,
            UpgradeIndex::PosV2,
            UpgradeIndex::Zerocoin,
            UpgradeIndex::ZerocoinV2,
            UpgradeIndex::Bip65,
            UpgradeIndex::ZerocoinPublic,
            UpgradeIndex::V3_4,
            UpgradeIndex::V4_0,
            UpgradeIndex::V5Dummy,
            UpgradeIndex::Lwma,
            UpgradeIndex::LwmaJump,
        ];
        INDICES.iter().copied()
    }

    #[inline]
    pub fn position(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            UpgradeIndex::BaseNetwork => "Base",
            UpgradeIndex::TestDummy => "Test dummy",
            UpgradeIndex::Pos => "PoS",
            UpgradeIndex::PosV2 => "PoS v2",
            UpgradeIndex::Zerocoin => "Zerocoin v1",
            UpgradeIndex::ZerocoinV2 => "Zerocoin v2",
            UpgradeIndex::Bip65 => "BIP65",
            UpgradeIndex::ZerocoinPublic => "Zerocoin Public",
            UpgradeIndex::V3_4 => "v3.4",
            UpgradeIndex::V4_0 => "v4.0",
            UpgradeIndex::V5Dummy => "v5 dummy",
            UpgradeIndex::Lwma => "LWMA retarget",
            UpgradeIndex::LwmaJump => "LWMA jump rule",
        }
    }
}

impl Display for UpgradeIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeEntry {
    pub index: UpgradeIndex,
    pub activation: ActivationHeight,
    /// When set, the block at exactly the activation height must have this hash
    pub activation_hash: Option<BlockHash>,
}

impl UpgradeEntry {
    pub const fn new(index: UpgradeIndex, activation: ActivationHeight) -> Self {
        Self { index, activation, activation_hash: None }
    }

    pub const fn with_hash(index: UpgradeIndex, activation: ActivationHeight, activation_hash: BlockHash) -> Self {
        Self { index, activation, activation_hash: Some(activation_hash) }
    }
}

/// Activation schedule of every network upgrade, one entry per [`UpgradeIndex`] stored at the
/// index position. Lookups assume a table which passed [`UpgradeTable::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeTable([UpgradeEntry; UpgradeIndex::COUNT]);

impl UpgradeTable {
    pub const fn new(entries: [UpgradeEntry; UpgradeIndex::COUNT]) -> Self {
        Self(entries)
    }

    #[inline]
    pub fn entry(&self, index: UpgradeIndex) -> &UpgradeEntry {
        &self.0[index.position()]
    }

    #[inline]
    pub fn activation(&self, index: UpgradeIndex) -> ActivationHeight {
        self.entry(index).activation
    }

    #[inline]
    pub fn is_active(&self, index: UpgradeIndex, height: u64) -> bool {
        self.activation(index).is_active(height)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeEntry> {
        self.0.iter()
    }

    pub(crate) fn set_activation(&mut self, index: UpgradeIndex, activation: ActivationHeight) {
        self.0[index.position()].activation = activation;
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (position, entry) in self.0.iter().enumerate() {
            if entry.index.position() != position {
                return Err(ConfigError::UpgradeOutOfPlace(position, entry.index));
            }
            if entry.activation_hash.is_some() && (entry.activation.is_always() || entry.activation.is_never()) {
                return Err(ConfigError::ActivationHashOnSentinel(entry.index));
            }
        }
        if !self.activation(UpgradeIndex::BaseNetwork).is_always() {
            return Err(ConfigError::BaseNetworkNotAlwaysActive);
        }
        // Upgrades which build on a previous one may not activate ahead of it
        for (later, earlier) in [(UpgradeIndex::PosV2, UpgradeIndex::Pos), (UpgradeIndex::LwmaJump, UpgradeIndex::Lwma)] {
            if self.activation(later) < self.activation(earlier) {
                return Err(ConfigError::UpgradeOrder(later, earlier));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::params::{MAINNET_PARAMS, REGTEST_PARAMS, TESTNET_PARAMS};

    #[test]
    fn test_activation_boundaries() {
        struct Test {
            name: &'static str,
            activation: ActivationHeight,
            height: u64,
            expected: bool,
        }

        let tests = [
            Test { name: "always at genesis", activation: ActivationHeight::always(), height: 0, expected: true },
            Test { name: "never below max", activation: ActivationHeight::never(), height: u64::MAX - 1, expected: false },
            Test { name: "never at max", activation: ActivationHeight::never(), height: u64::MAX, expected: false },
            Test { name: "one before", activation: ActivationHeight::new(200), height: 199, expected: false },
            Test { name: "exactly at", activation: ActivationHeight::new(200), height: 200, expected: true },
            Test { name: "after", activation: ActivationHeight::new(200), height: 201, expected: true },
        ];

        for test in tests {
            assert_eq!(test.activation.is_active(test.height), test.expected, "{}", test.name);
        }
    }

    #[test]
    fn test_network_tables_are_valid() {
        for params in [MAINNET_PARAMS, TESTNET_PARAMS, REGTEST_PARAMS] {
            params.upgrades.validate().unwrap();
            for index in UpgradeIndex::iter() {
                assert_eq!(params.upgrades.entry(index).index, index);
            }
        }
        assert!(MAINNET_PARAMS.upgrades.is_active(UpgradeIndex::BaseNetwork, 0));
        assert!(!MAINNET_PARAMS.upgrades.is_active(UpgradeIndex::Pos, 199));
        assert!(MAINNET_PARAMS.upgrades.is_active(UpgradeIndex::Pos, 200));
        assert!(!MAINNET_PARAMS.upgrades.is_active(UpgradeIndex::LwmaJump, u64::MAX - 1));
    }

    #[test]
    fn test_invalid_tables() {
        let valid = REGTEST_PARAMS.upgrades;

        let mut swapped = valid.clone();
        swapped.0.swap(2, 3);
        assert_eq!(swapped.validate(), Err(ConfigError::UpgradeOutOfPlace(2, UpgradeIndex::PosV2)));

        let mut late_base = valid.clone();
        late_base.set_activation(UpgradeIndex::BaseNetwork, ActivationHeight::new(1));
        assert_eq!(late_base.validate(), Err(ConfigError::BaseNetworkNotAlwaysActive));

        let mut early_v2 = valid.clone();
        early_v2.set_activation(UpgradeIndex::PosV2, ActivationHeight::new(10));
        assert_eq!(early_v2.validate(), Err(ConfigError::UpgradeOrder(UpgradeIndex::PosV2, UpgradeIndex::Pos)));

        let mut early_jump = valid.clone();
        early_jump.set_activation(UpgradeIndex::LwmaJump, ActivationHeight::new(5));
        assert_eq!(early_jump.validate(), Err(ConfigError::UpgradeOrder(UpgradeIndex::LwmaJump, UpgradeIndex::Lwma)));

        let mut hashed = valid;
        hashed.0[UpgradeIndex::TestDummy.position()].activation_hash = Some(BlockHash::from_bytes([1; 32]));
        assert_eq!(hashed.validate(), Err(ConfigError::ActivationHashOnSentinel(UpgradeIndex::TestDummy)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ActivationHeight::always().to_string(), "always");
        assert_eq!(ActivationHeight::never().to_string(), "never");
        assert_eq!(ActivationHeight::new(201).to_string(), "201");
        assert_eq!(UpgradeIndex::LwmaJump.to_string(), "LWMA jump rule");
        assert_eq!(UpgradeIndex::iter().count(), UpgradeIndex::COUNT);
        assert!(UpgradeIndex::iter().enumerate().all(|(i, index)| index.position() == i));
    }
}
