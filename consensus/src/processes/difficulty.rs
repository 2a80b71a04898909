use itertools::Itertools;
use rapids_consensus_core::{
    ancestry::ChainAncestry,
    block::BlockRef,
    config::params::{
        Params, LEGACY_MAX_SPACING_FACTOR, LWMA_JUMP_FACTOR_DENOMINATOR, LWMA_JUMP_FACTOR_NUMERATOR, LWMA_JUMP_THRESHOLD_DENOMINATOR,
        LWMA_JUMP_THRESHOLD_NUMERATOR, LWMA_JUMP_WINDOW, LWMA_MAX_SOLVETIME_FACTOR,
    },
    errors::{
        config::ConfigResult,
        difficulty::{DifficultyError, DifficultyResult},
    },
    upgrades::{ActivationHeight, UpgradeIndex},
};
use rapids_core::{debug, trace};
use rapids_math::{Uint256, Uint320};
use std::fmt::{Display, Formatter};

/// The retarget algorithms a chain went through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DifficultyAlgorithm {
    /// Single interval exponential moving retarget, PoW and PoS adjusted independently
    Legacy,
    /// Linearly weighted moving average over the last `lwma_window` blocks
    Lwma,
    /// [`DifficultyAlgorithm::Lwma`] with a sharp increase when the last few blocks came in too fast
    LwmaJump,
}

impl Display for DifficultyAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DifficultyAlgorithm::Legacy => "legacy",
            DifficultyAlgorithm::Lwma => "lwma",
            DifficultyAlgorithm::LwmaJump => "lwma-jump",
        };
        f.write_str(s)
    }
}

/// Height ranges of the retarget algorithms, derived once from the upgrade table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DifficultySchedule {
    /// `(first height, algorithm)` sorted by height. The first range always starts at genesis.
    ranges: Vec<(u64, DifficultyAlgorithm)>,
}

impl DifficultySchedule {
    pub fn new(params: &Params) -> Self {
        let upgrades = &params.upgrades;
        let ranges = [
            (ActivationHeight::always(), DifficultyAlgorithm::Legacy),
            (upgrades.activation(UpgradeIndex::Lwma), DifficultyAlgorithm::Lwma),
            (upgrades.activation(UpgradeIndex::LwmaJump), DifficultyAlgorithm::LwmaJump),
        ]
        .into_iter()
        .filter(|(activation, _)| !activation.is_never())
        .map(|(activation, algorithm)| (activation.height(), algorithm))
        // A later upgrade activating at the same height shadows the earlier one
        .coalesce(|prev, next| if prev.0 == next.0 { Ok(next) } else { Err((prev, next)) })
        .collect();
        Self { ranges }
    }

    /// The algorithm computing the bits of a block at `height`
    pub fn algorithm_at(&self, height: u64) -> DifficultyAlgorithm {
        self.ranges.iter().rev().find(|(start, _)| *start <= height).map_or(DifficultyAlgorithm::Legacy, |(_, algorithm)| *algorithm)
    }

    pub fn ranges(&self) -> &[(u64, DifficultyAlgorithm)] {
        &self.ranges
    }
}

/// Computes the bits required from the next block on top of a chain tip.
///
/// All targets are handled as [`Uint256`] and every intermediate product is computed in [`Uint320`]. The
/// parameter bounds enforced by [`Params::validate`] keep the products within 320 bits, and results are
/// clamped to the network limit before narrowing back.
#[derive(Clone, Debug)]
pub struct DifficultyManager {
    schedule: DifficultySchedule,
    pow_limit: Uint256,
    pos_limit: Uint256,
    pow_target_spacing: u64,
    pos_target_spacing: u64,
    pow_target_timespan: u64,
    lwma_window: u64,
    allow_min_difficulty_blocks: bool,
}

impl DifficultyManager {
    /// Fails on parameters which would let a retarget divide by zero or produce zero bits
    pub fn new(params: &Params) -> ConfigResult<Self> {
        params.validate()?;
        Ok(Self {
            schedule: DifficultySchedule::new(params),
            pow_limit: params.pow_limit,
            pos_limit: params.pos_limit,
            pow_target_spacing: params.pow_target_spacing,
            pos_target_spacing: params.pos_target_spacing,
            pow_target_timespan: params.pow_target_timespan,
            lwma_window: params.lwma_window,
            allow_min_difficulty_blocks: params.allow_min_difficulty_blocks,
        })
    }

    pub fn schedule(&self) -> &DifficultySchedule {
        &self.schedule
    }

    #[inline]
    fn limit(&self, is_proof_of_stake: bool) -> Uint256 {
        if is_proof_of_stake { self.pos_limit } else { self.pow_limit }
    }

    #[inline]
    fn target_spacing(&self, is_proof_of_stake: bool) -> u64 {
        if is_proof_of_stake { self.pos_target_spacing } else { self.pow_target_spacing }
    }

    /// Required bits of the block following `tip`, which is `None` before genesis. An empty history
    /// resolves to the limit of the requested proof type.
    pub fn next_required_bits<C: ChainAncestry + ?Sized>(
        &self,
        chain: &C,
        tip: Option<&BlockRef>,
        is_proof_of_stake: bool,
    ) -> DifficultyResult<u32> {
        let Some(tip) = tip else {
            return Ok(self.limit(is_proof_of_stake).compact_target_bits());
        };
        let height = tip.height.saturating_add(1);
        let algorithm = self.schedule.algorithm_at(height);
        trace!("Retargeting block {} ({}) with the {} algorithm", height, if is_proof_of_stake { "PoS" } else { "PoW" }, algorithm);
        match algorithm {
            DifficultyAlgorithm::Legacy => Ok(self.calc_legacy_bits(chain, tip, is_proof_of_stake)),
            DifficultyAlgorithm::Lwma => self.calc_lwma_bits(chain, tip, is_proof_of_stake, false),
            DifficultyAlgorithm::LwmaJump => self.calc_lwma_bits(chain, tip, is_proof_of_stake, true),
        }
    }

    /// Retargets from the spacing between the last two blocks of the requested proof type. Blocks of the
    /// other type are skipped, so PoW and PoS difficulties evolve independently.
    pub fn calc_legacy_bits<C: ChainAncestry + ?Sized>(&self, chain: &C, tip: &BlockRef, is_proof_of_stake: bool) -> u32 {
        let limit = self.limit(is_proof_of_stake);

        let prev = chain.last_of_kind(tip, is_proof_of_stake);
        let Some(prev_parent) = chain.parent(&prev) else {
            // First block of this kind
            return limit.compact_target_bits();
        };
        let prev_prev = chain.last_of_kind(&prev_parent, is_proof_of_stake);
        if chain.parent(&prev_prev).is_none() {
            // Second block of this kind
            return limit.compact_target_bits();
        }

        if prev.is_proof_of_work() && self.allow_min_difficulty_blocks {
            return prev.bits;
        }

        let spacing = self.target_spacing(prev.is_proof_of_stake);
        // A block older than its predecessor counts as on time
        let actual_spacing = match prev.timestamp.checked_sub(prev_prev.timestamp) {
            Some(actual) => actual.min(spacing * LEGACY_MAX_SPACING_FACTOR),
            None => spacing,
        };

        let interval = self.pow_target_timespan / spacing;
        let prev_target = Uint320::from(Uint256::from_compact_target_bits(prev.bits));
        let new_target = prev_target * ((interval - 1) * spacing + 2 * actual_spacing) / ((interval + 1) * spacing);

        if new_target.is_zero() || new_target > Uint320::from(limit) {
            debug!("Legacy retarget of block {} snapped to the limit", tip.height + 1);
            return limit.compact_target_bits();
        }
        new_target.clamp_to(limit).compact_target_bits()
    }

    /// Linearly weighted moving average of the last `lwma_window` blocks of the chain, regardless of their
    /// proof type. Recent solve times weigh more. With `jump_rule`, a run of fast blocks raises the
    /// difficulty immediately instead of through the average.
    pub fn calc_lwma_bits<C: ChainAncestry + ?Sized>(
        &self,
        chain: &C,
        tip: &BlockRef,
        is_proof_of_stake: bool,
        jump_rule: bool,
    ) -> DifficultyResult<u32> {
        let limit = self.limit(is_proof_of_stake);
        let spacing = self.pos_target_spacing;
        let window = self.lwma_window;
        let height = tip.height;

        if height < window {
            return Ok(limit.compact_target_bits());
        }

        // Normalizes the weighted solve time sum, which equals `k` when every block takes exactly `spacing`
        let k = window * (window + 1) * spacing / 2;
        let ancestor = |h: u64| chain.ancestor_at(tip, h).ok_or(DifficultyError::MissingAncestor(h));

        let mut prev_timestamp = ancestor(height - window)?.timestamp;
        let mut weighted_solvetimes = 0u64;
        let mut target_sum = Uint320::ZERO;
        let mut solvetimes = Vec::with_capacity(window as usize);
        for (weight, h) in (height - window + 1..=height).enumerate() {
            let block = ancestor(h)?;
            // Timestamps are forced to increase by at least a second
            let timestamp = block.timestamp.max(prev_timestamp.saturating_add(1));
            let solvetime = timestamp - prev_timestamp;
            prev_timestamp = timestamp;

            weighted_solvetimes += solvetime.min(LWMA_MAX_SOLVETIME_FACTOR * spacing) * (weight as u64 + 1);
            target_sum = target_sum + Uint320::from(Uint256::from_compact_target_bits(block.bits) / (k * window));
            solvetimes.push(solvetime);
        }

        let mut next_target = target_sum * weighted_solvetimes;

        if jump_rule && window >= LWMA_JUMP_WINDOW {
            let recent = solvetimes.iter().rev().take(LWMA_JUMP_WINDOW as usize).fold(0u128, |sum, &st| sum + st as u128);
            let threshold = (LWMA_JUMP_WINDOW * spacing * LWMA_JUMP_THRESHOLD_NUMERATOR) as u128;
            if recent * (LWMA_JUMP_THRESHOLD_DENOMINATOR as u128) < threshold {
                let prev_target = Uint320::from(Uint256::from_compact_target_bits(tip.bits));
                next_target = prev_target * 100u64 / (100 + window * LWMA_JUMP_FACTOR_NUMERATOR / LWMA_JUMP_FACTOR_DENOMINATOR);
                debug!("Jump rule raised the difficulty of block {}, last solve times sum to {}s", height + 1, recent);
            }
        }

        if next_target > Uint320::from(limit) {
            debug!("Windowed retarget of block {} snapped to the limit", height + 1);
        }
        Ok(next_target.clamp_to(limit).compact_target_bits())
    }
}
