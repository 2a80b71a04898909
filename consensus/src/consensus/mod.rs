use crate::{
    errors::{BlockProcessResult, RuleError},
    processes::difficulty::DifficultyManager,
};
use rapids_consensus_core::{
    ChainWork,
    ancestry::ChainAncestry,
    block::BlockRef,
    blockhash::BlockHash,
    config::{Config, params::Params},
    errors::{config::ConfigResult, difficulty::DifficultyResult, pow::PowResult},
    network::NetworkId,
    upgrades::UpgradeIndex,
};
use rapids_core::trace;
use std::sync::Arc;

/// Entry point to the consensus rules of a network. Holds no chain state: the block index is passed
/// into every call through [`ChainAncestry`].
#[derive(Clone)]
pub struct ConsensusRules {
    config: Arc<Config>,
    difficulty_manager: DifficultyManager,
}

impl ConsensusRules {
    pub fn new(config: Arc<Config>) -> ConfigResult<Self> {
        let difficulty_manager = DifficultyManager::new(&config.params)?;
        Ok(Self { config, difficulty_manager })
    }

    pub fn from_network(net: NetworkId) -> ConfigResult<Self> {
        Self::new(Arc::new(Config::new(Params::from(net))))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn params(&self) -> &Params {
        &self.config.params
    }

    pub fn difficulty_manager(&self) -> &DifficultyManager {
        &self.difficulty_manager
    }

    /// Bits the block following `tip` must carry
    pub fn next_required_bits<C: ChainAncestry + ?Sized>(
        &self,
        chain: &C,
        tip: Option<&BlockRef>,
        is_proof_of_stake: bool,
    ) -> DifficultyResult<u32> {
        self.difficulty_manager.next_required_bits(chain, tip, is_proof_of_stake)
    }

    pub fn check_proof_of_work(&self, hash: &BlockHash, bits: u32) -> PowResult<()> {
        rapids_pow::check_proof_of_work(self.params(), hash, bits)
    }

    pub fn is_valid_proof_of_work(&self, hash: &BlockHash, bits: u32) -> bool {
        rapids_pow::is_valid_proof_of_work(self.params(), hash, bits)
    }

    pub fn block_proof(&self, block: &BlockRef) -> ChainWork {
        rapids_pow::block_proof(block)
    }

    #[inline]
    pub fn is_upgrade_active(&self, index: UpgradeIndex, height: u64) -> bool {
        self.params().is_upgrade_active(index, height)
    }

    /// Hardcoded checkpoints only bind when the configuration enforces them
    pub fn check_checkpoint(&self, height: u64, hash: &BlockHash) -> bool {
        !self.config.enforce_checkpoints || self.params().check_checkpoint(height, hash)
    }

    /// Checks the header level rules of `block` as the successor of `tip`: height linkage, proof type phase,
    /// future drift, time slot, required bits, proof of work, checkpoints and activation blocks. The
    /// genesis block is accepted as configured, apart from checkpoints.
    pub fn validate_block<C: ChainAncestry + ?Sized>(
        &self,
        chain: &C,
        tip: Option<&BlockRef>,
        block: &BlockRef,
        adjusted_time: u64,
    ) -> BlockProcessResult<()> {
        let params = self.params();
        let expected_height = tip.map_or(0, |tip| tip.height + 1);
        if block.height != expected_height {
            return Err(RuleError::UnexpectedHeight(block.height, expected_height));
        }

        if tip.is_some() {
            self.validate_header_in_context(chain, tip, block, adjusted_time)?;
        }

        if !self.check_checkpoint(block.height, &block.hash) {
            return Err(RuleError::CheckpointMismatch(block.height, block.hash));
        }
        if let Some(index) = UpgradeIndex::iter().find(|&index| !params.check_activation_block(index, block.height, &block.hash)) {
            return Err(RuleError::ActivationBlockMismatch(index, block.hash));
        }

        trace!("Block {} at height {} passed the consensus rules", block.hash, block.height);
        Ok(())
    }

    fn validate_header_in_context<C: ChainAncestry + ?Sized>(
        &self,
        chain: &C,
        tip: Option<&BlockRef>,
        block: &BlockRef,
        adjusted_time: u64,
    ) -> BlockProcessResult<()> {
        let params = self.params();
        let height = block.height;

        if block.is_proof_of_stake {
            if !self.is_upgrade_active(UpgradeIndex::Pos, height) {
                return Err(RuleError::ProofOfStakeNotActive(height));
            }
        } else if !params.is_pow_phase(height) {
            return Err(RuleError::ProofOfWorkPhaseEnded(height));
        }

        let max_time = params.max_future_block_time(adjusted_time, block.is_proof_of_stake);
        if block.timestamp > max_time {
            return Err(RuleError::TimeTooMuchInTheFuture(block.timestamp, max_time));
        }
        if block.is_proof_of_stake && self.is_upgrade_active(UpgradeIndex::PosV2, height) && !params.is_valid_block_time_slot(block.timestamp)
        {
            return Err(RuleError::InvalidTimeSlot(block.timestamp));
        }

        let required_bits = self.next_required_bits(chain, tip, block.is_proof_of_stake)?;
        if block.bits != required_bits {
            return Err(RuleError::UnexpectedDifficulty(block.hash, block.bits, required_bits));
        }
        if block.is_proof_of_work() {
            self.check_proof_of_work(&block.hash, block.bits)?;
        }
        Ok(())
    }
}
