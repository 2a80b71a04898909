use crate::blockhash::BlockHash;
use serde::{Deserialize, Serialize};

/// Read-only view of an indexed block, as much of it as consensus needs to derive
/// difficulty and validate proofs. Linkage to the parent is resolved through a [`ChainAncestry`](crate::ancestry::ChainAncestry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRef {
    pub hash: BlockHash,
    pub height: u64,
    /// Header timestamp in seconds
    pub timestamp: u64,
    /// Compact target the block was mined or staked against
    pub bits: u32,
    pub is_proof_of_stake: bool,
}

impl BlockRef {
    pub fn new(hash: BlockHash, height: u64, timestamp: u64, bits: u32, is_proof_of_stake: bool) -> Self {
        Self { hash, height, timestamp, bits, is_proof_of_stake }
    }

    #[inline]
    pub fn is_proof_of_work(&self) -> bool {
        !self.is_proof_of_stake
    }

    #[inline]
    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }
}
