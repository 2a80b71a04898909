use rapids_consensus_core::{ChainWork, ancestry::ChainAncestry, block::BlockRef, blockhash::BlockHash};
use rapids_pow::block_proof;

/// An append-only, single chain block index kept in memory. Block `i` is stored at position `i`
/// together with the cumulative work of the chain up to and including it.
#[derive(Clone, Debug, Default)]
pub struct MemoryChain {
    blocks: Vec<BlockRef>,
    cumulative_work: Vec<ChainWork>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genesis(genesis: BlockRef) -> Self {
        let mut chain = Self::new();
        chain.push(genesis.hash, genesis.timestamp, genesis.bits, genesis.is_proof_of_stake);
        chain
    }

    /// Appends a block on top of the current tip and returns it. The height is implied by the position.
    /// Cumulative work saturates at [`ChainWork::MAX`].
    pub fn push(&mut self, hash: BlockHash, timestamp: u64, bits: u32, is_proof_of_stake: bool) -> BlockRef {
        let block = BlockRef::new(hash, self.blocks.len() as u64, timestamp, bits, is_proof_of_stake);
        let work = match self.chain_work().overflowing_add(block_proof(&block)) {
            (work, false) => work,
            (_, true) => ChainWork::MAX,
        };
        self.blocks.push(block);
        self.cumulative_work.push(work);
        block
    }

    pub fn tip(&self) -> Option<&BlockRef> {
        self.blocks.last()
    }

    pub fn get(&self, height: u64) -> Option<&BlockRef> {
        self.blocks.get(usize::try_from(height).ok()?)
    }

    /// Whether `block` is the entry stored at its height
    pub fn contains(&self, block: &BlockRef) -> bool {
        self.get(block.height).is_some_and(|stored| stored.hash == block.hash)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &BlockRef> {
        self.blocks.iter()
    }

    /// Cumulative work of the whole chain, zero when empty
    pub fn chain_work(&self) -> ChainWork {
        self.cumulative_work.last().copied().unwrap_or(ChainWork::ZERO)
    }

    pub fn work_at(&self, height: u64) -> Option<ChainWork> {
        self.cumulative_work.get(usize::try_from(height).ok()?).copied()
    }
}

impl ChainAncestry for MemoryChain {
    fn parent(&self, block: &BlockRef) -> Option<BlockRef> {
        if block.is_genesis() {
            return None;
        }
        self.ancestor_at(block, block.height - 1)
    }

    fn ancestor_at(&self, block: &BlockRef, height: u64) -> Option<BlockRef> {
        if height > block.height || !self.contains(block) {
            return None;
        }
        self.get(height).copied()
    }
}
