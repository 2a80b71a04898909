use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

#[derive(thiserror::Error, PartialEq, Eq, Debug, Clone)]
pub enum NetworkIdError {
    #[error("Invalid network type: {0}")]
    InvalidNetworkType(String),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, BorshSerialize, BorshDeserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Mainnet,
    Testnet,
    Regtest,
}

impl NetworkId {
    /// Regtest is the only network whose parameters may be patched, and whose proofs are not checked
    #[inline]
    pub fn is_regtest(&self) -> bool {
        matches!(self, NetworkId::Regtest)
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        static NETWORK_IDS: [NetworkId; 3] = [NetworkId::Mainnet, NetworkId::Testnet, NetworkId::Regtest];
        NETWORK_IDS.iter().copied()
    }
}

impl FromStr for NetworkId {
    type Err = NetworkIdError;
    fn from_str(network_id: &str) -> Result<Self, Self::Err> {
        match network_id.to_lowercase().as_str() {
            "main" | "mainnet" => Ok(NetworkId::Mainnet),
            "test" | "testnet" => Ok(NetworkId::Testnet),
            "regtest" => Ok(NetworkId::Regtest),
            _ => Err(NetworkIdError::InvalidNetworkType(network_id.to_string())),
        }
    }
}

impl Display for NetworkId {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NetworkId::Mainnet => "mainnet",
            NetworkId::Testnet => "testnet",
            NetworkId::Regtest => "regtest",
        };
        f.write_str(s)
    }
}
