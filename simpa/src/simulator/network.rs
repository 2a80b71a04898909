use super::miner::{difficulty, Miner};
use crate::errors::SimResult;
use rapids_consensus::{consensus::ConsensusRules, model::chain::MemoryChain, processes::difficulty::DifficultyAlgorithm};
use rapids_consensus_core::{block::BlockRef, upgrades::UpgradeIndex};
use rapids_core::{info, trace};
use rapids_math::Uint256;

/// Multiplies the hashrate once the chain reaches `height`
#[derive(Clone, Copy, Debug)]
pub struct HashrateJump {
    pub height: u64,
    pub factor: f64,
}

/// One generated block with the circumstances it was produced in
#[derive(Clone, Debug)]
pub struct BlockSample {
    pub block: BlockRef,
    pub algorithm: DifficultyAlgorithm,
    pub solve_time: u64,
    pub difficulty: f64,
    pub hashrate: f64,
}

pub struct RapidsNetworkSimulator {
    rules: ConsensusRules,
    chain: MemoryChain,
    tip: BlockRef,
    miner: Miner,
    hashrate_jump: Option<HashrateJump>,
    samples: Vec<BlockSample>,
}

impl RapidsNetworkSimulator {
    pub fn new(rules: ConsensusRules, miner: Miner, hashrate_jump: Option<HashrateJump>) -> SimResult<Self> {
        let genesis = rules.params().genesis.block_ref();
        rules.validate_block(&MemoryChain::new(), None, &genesis, genesis.timestamp)?;
        Ok(Self { chain: MemoryChain::with_genesis(genesis), tip: genesis, rules, miner, hashrate_jump, samples: Vec::new() })
    }

    pub fn chain(&self) -> &MemoryChain {
        &self.chain
    }

    /// One sample per simulated block, in height order
    pub fn samples(&self) -> &[BlockSample] {
        &self.samples
    }

    /// Extends the chain by `blocks` blocks, each of which has to pass the consensus rules
    pub fn run(&mut self, blocks: u64) -> SimResult<()> {
        for _ in 0..blocks {
            self.step()?;
        }
        Ok(())
    }

    fn step(&mut self) -> SimResult<()> {
        let params = self.rules.params();
        let height = self.tip.height + 1;
        if let Some(jump) = self.hashrate_jump.filter(|jump| jump.height == height) {
            let hashrate = self.miner.hashrate() * jump.factor;
            info!("Hashrate changes from {} to {} at height {}", self.miner.hashrate(), hashrate, height);
            self.miner.set_hashrate(hashrate);
        }

        let is_proof_of_stake = !params.is_pow_phase(height);
        let bits = self.rules.next_required_bits(&self.chain, Some(&self.tip), is_proof_of_stake)?;
        let target = Uint256::from_compact_target_bits(bits);
        let solve_time = self.miner.solve_time(params, target, is_proof_of_stake)?;
        let prev_timestamp = self.tip.timestamp;
        let mut timestamp = prev_timestamp + solve_time;
        if is_proof_of_stake && params.is_upgrade_active(UpgradeIndex::PosV2, height) && !params.is_valid_block_time_slot(timestamp) {
            // Stakers can only use the next slot
            timestamp = params.time_slot_floor(timestamp) + params.time_slot_length;
        }

        let block = BlockRef::new(self.miner.find_hash(target), height, timestamp, bits, is_proof_of_stake);
        self.rules.validate_block(&self.chain, Some(&self.tip), &block, timestamp)?;
        self.tip = self.chain.push(block.hash, block.timestamp, block.bits, block.is_proof_of_stake);

        let algorithm = self.rules.difficulty_manager().schedule().algorithm_at(height);
        trace!("Block {} at height {} with bits {:#010x} ({})", block.hash, height, bits, algorithm);
        self.samples.push(BlockSample {
            block,
            algorithm,
            solve_time: timestamp - prev_timestamp,
            difficulty: difficulty(params, target, is_proof_of_stake),
            hashrate: self.miner.hashrate(),
        });
        Ok(())
    }
}
