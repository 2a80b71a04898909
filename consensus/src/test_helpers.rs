use crate::model::chain::MemoryChain;
use rapids_consensus_core::{block::BlockRef, blockhash::BlockHash};
use rapids_math::Uint256;

/// Deterministic, distinct hash for the synthetic block at `height`
pub fn block_hash_at(height: u64) -> BlockHash {
    BlockHash::from_uint256(Uint256::from_u128(((height as u128) << 64) | 0x5a5a_5a5a))
}

/// Builds a chain from a genesis at `genesis_time` followed by one block per `(solve time, bits, is proof of stake)` item
pub fn chain_from_solve_times(genesis_time: u64, genesis_bits: u32, blocks: impl IntoIterator<Item = (u64, u32, bool)>) -> MemoryChain {
    let mut chain = MemoryChain::with_genesis(BlockRef::new(block_hash_at(0), 0, genesis_time, genesis_bits, false));
    let mut timestamp = genesis_time;
    for (solve_time, bits, is_proof_of_stake) in blocks {
        timestamp += solve_time;
        chain.push(block_hash_at(chain.len() as u64), timestamp, bits, is_proof_of_stake);
    }
    chain
}

/// Like [`chain_from_solve_times`] with a constant solve time, bits and proof type
pub fn steady_chain(genesis_time: u64, len: u64, solve_time: u64, bits: u32, is_proof_of_stake: bool) -> MemoryChain {
    chain_from_solve_times(genesis_time, bits, (1..len).map(|_| (solve_time, bits, is_proof_of_stake)))
}
