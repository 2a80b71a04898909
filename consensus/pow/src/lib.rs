//! Block proof validation and chain work.
//!
//! Both operations are pure functions of the compact target bits, the block hash and the network
//! parameters.

use rapids_consensus_core::{
    ChainWork,
    block::BlockRef,
    blockhash::BlockHash,
    config::params::Params,
    errors::pow::{PowError, PowResult},
};
use rapids_core::warn;
use rapids_math::{CompactTarget, Uint256};

/// State is an intermediate data structure holding a decoded and range checked target, so that several
/// hashes can be checked against the same bits.
pub struct State {
    target: Uint256,
}

impl State {
    /// Decodes `bits` and rejects negative, zero and overflowing targets, as well as targets above `pow_limit`
    #[inline]
    pub fn new(bits: u32, pow_limit: Uint256) -> PowResult<Self> {
        let target = CompactTarget(bits).to_target()?;
        if target > pow_limit {
            return Err(PowError::TargetAboveLimit(target, pow_limit));
        }
        Ok(Self { target })
    }

    #[inline]
    pub fn target(&self) -> Uint256 {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn check_pow(&self, hash: &BlockHash) -> (bool, Uint256) {
        let pow = hash.to_uint256();
        // The pow hash must be less or equal than the claimed target.
        (pow <= self.target, pow)
    }
}

/// Checks that `hash` satisfies the target encoded by `bits` and that the target is within the proof of work
/// ceiling of the network. Regtest accepts every proof.
pub fn check_proof_of_work(params: &Params, hash: &BlockHash, bits: u32) -> PowResult<()> {
    if params.net.is_regtest() {
        return Ok(());
    }
    let state = State::new(bits, params.pow_limit)?;
    match state.check_pow(hash) {
        (true, _) => Ok(()),
        (false, _) => Err(PowError::HashAboveTarget(*hash, state.target)),
    }
}

/// Boolean flavour of [`check_proof_of_work`] which logs the reason of a rejection
pub fn is_valid_proof_of_work(params: &Params, hash: &BlockHash, bits: u32) -> bool {
    match check_proof_of_work(params, hash, bits) {
        Ok(()) => true,
        Err(err) => {
            warn!("Block {} failed the proof of work check with bits {:#010x}: {}", hash, bits, err);
            false
        }
    }
}

/// Expected number of hashes needed to hit the target encoded by `bits`. Invalid bits carry no work.
pub fn calc_work(bits: u32) -> ChainWork {
    let Ok(target) = CompactTarget(bits).to_target() else {
        return ChainWork::ZERO;
    };
    // We need to compute 2**256 / (target+1), but 2**256 does not fit in 256 bits. As 2**256 is at least
    // as large as target+1, it is equal to ((2**256 - target - 1) / (target+1)) + 1, or ~target / (target+1) + 1.
    // A valid target is far below Uint256::MAX so `target + 1` cannot overflow.
    (!target / (target + 1u64)) + 1u64
}

/// Work contributed by `block` to the cumulative work of its chain
#[inline]
pub fn block_proof(block: &BlockRef) -> ChainWork {
    calc_work(block.bits)
}
