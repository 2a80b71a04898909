use crate::block::BlockRef;

/// Backward access into the block index, implemented by whoever owns chain state.
///
/// Implementations must be consistent: `parent(b)` has height `b.height - 1`, and `ancestor_at(b, h)`
/// for `h <= b.height` is the block at height `h` on the chain ending at `b`.
pub trait ChainAncestry {
    /// The direct parent, `None` for genesis
    fn parent(&self, block: &BlockRef) -> Option<BlockRef>;

    /// The ancestor of `block` at `height`, `None` if `height > block.height`
    fn ancestor_at(&self, block: &BlockRef, height: u64) -> Option<BlockRef>;

    /// Walks back from `from` to the nearest block of the requested proof type. Stops at genesis,
    /// which is returned when no block of that type exists.
    fn last_of_kind(&self, from: &BlockRef, is_proof_of_stake: bool) -> BlockRef {
        let mut current = *from;
        while current.is_proof_of_stake != is_proof_of_stake {
            match self.parent(&current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }
}

impl<T: ChainAncestry + ?Sized> ChainAncestry for &T {
    fn parent(&self, block: &BlockRef) -> Option<BlockRef> {
        (**self).parent(block)
    }

    fn ancestor_at(&self, block: &BlockRef, height: u64) -> Option<BlockRef> {
        (**self).ancestor_at(block, height)
    }
}
