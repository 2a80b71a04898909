use crate::{
    block::BlockRef,
    blockhash::{self, BlockHash},
    config::constants::consensus::COIN,
};

/// The constant header and coinbase data every node builds its genesis block from
#[derive(Clone, Debug)]
pub struct GenesisBlock {
    /// Expected hash of the assembled block, when the network pins one
    pub hash: Option<BlockHash>,
    /// Expected merkle root of the single coinbase transaction, when the network pins one
    pub merkle_root: Option<BlockHash>,
    pub version: u32,
    pub timestamp: u64,
    pub nonce: u32,
    pub bits: u32,
    pub reward: u64,
    /// Message embedded in the coinbase input script
    pub coinbase_message: &'static str,
    /// Script of the coinbase output, the genesis output cannot be spent
    pub output_script: &'static [u8],
}

impl GenesisBlock {
    /// The genesis block as a chain index entry. Networks without a pinned hash use [`blockhash::NONE`].
    pub fn block_ref(&self) -> BlockRef {
        BlockRef::new(self.hash.unwrap_or(blockhash::NONE), 0, self.timestamp, self.bits, false)
    }
}

const GENESIS_COINBASE_MESSAGE: &str = "RPD New Chain";

/// Pay-to-pubkey: push of a 65 byte uncompressed key followed by OP_CHECKSIG
const GENESIS_OUTPUT_SCRIPT: &[u8] = &[
    0x41, 0x04, 0xf5, 0x1f, 0xa7, 0xf2, 0xcf, 0x12, 0x17, 0x75, 0x76, 0xb4, 0x29, 0x46, 0x18, 0xde, //
    0xd1, 0x75, 0xdb, 0x33, 0xf3, 0xc6, 0x44, 0xb6, 0x8e, 0x3f, 0xb6, 0x6f, 0x59, 0xea, 0x49, 0xe0, //
    0x2f, 0x1e, 0xae, 0x1a, 0xfc, 0xdb, 0x00, 0x04, 0x81, 0x22, 0x66, 0x85, 0x70, 0x86, 0x61, 0xab, //
    0xb4, 0xce, 0x72, 0x82, 0x49, 0x58, 0xef, 0x23, 0x99, 0x4a, 0x08, 0x6d, 0x07, 0xff, 0xf8, 0xe1, //
    0xe7, 0xd1, 0xac,
];

const GENESIS_MERKLE_ROOT: BlockHash = BlockHash::from_hex_const("e980eec274480a0309fa533f5c35269f402c1ba5a4af59acc5585ae0d0c44802");

pub const GENESIS: GenesisBlock = GenesisBlock {
    hash: Some(BlockHash::from_hex_const("00000b444395e32c86230466900dba6483f9175cd385c1aa4456651a848900ed")),
    merkle_root: Some(GENESIS_MERKLE_ROOT),
    version: 1,
    timestamp: 1679198507,
    nonce: 8020,
    bits: 0x1e0ffff0,
    reward: 0,
    coinbase_message: GENESIS_COINBASE_MESSAGE,
    output_script: GENESIS_OUTPUT_SCRIPT,
};

pub const TESTNET_GENESIS: GenesisBlock = GenesisBlock {
    hash: Some(BlockHash::from_hex_const("000006bc3b91b1f97edfafe72c6226f5bd337087f2e4b0ca636ff9b0cfc12e7e")),
    merkle_root: Some(GENESIS_MERKLE_ROOT),
    version: 1,
    timestamp: 1674751352,
    nonce: 1047466,
    bits: 0x1e0ffff0,
    reward: 0,
    coinbase_message: GENESIS_COINBASE_MESSAGE,
    output_script: GENESIS_OUTPUT_SCRIPT,
};

// The regtest genesis is never mined against a pinned hash
pub const REGTEST_GENESIS: GenesisBlock = GenesisBlock {
    hash: None,
    merkle_root: None,
    version: 1,
    timestamp: 1454124731,
    nonce: 2402015,
    bits: 0x1e0ffff0,
    reward: 250 * COIN,
    coinbase_message: GENESIS_COINBASE_MESSAGE,
    output_script: GENESIS_OUTPUT_SCRIPT,
};

#[cfg(test)]
mod tests {
    use super::*;
    use rapids_math::CompactTarget;

    #[test]
    fn test_genesis_descriptors() {
        for genesis in [GENESIS, TESTNET_GENESIS, REGTEST_GENESIS] {
            assert_eq!(genesis.output_script.len(), 67);
            assert_eq!(genesis.output_script[0] as usize, genesis.output_script.len() - 2);
            assert_eq!(genesis.output_script.last(), Some(&0xac));
            assert!(CompactTarget(genesis.bits).to_target().is_ok());
            let block = genesis.block_ref();
            assert_eq!(block.height, 0);
            assert!(block.is_proof_of_work());
        }

        // Pinned genesis hashes satisfy their own target
        for genesis in [GENESIS, TESTNET_GENESIS] {
            let hash = genesis.hash.unwrap();
            assert!(hash.to_uint256() <= CompactTarget(genesis.bits).to_target().unwrap());
        }
        assert!(REGTEST_GENESIS.block_ref().hash.is_none());
    }
}
