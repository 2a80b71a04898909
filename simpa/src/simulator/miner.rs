use crate::errors::{SimError, SimResult};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp};
use rapids_consensus_core::{blockhash::BlockHash, config::params::Params};
use rapids_math::Uint256;

/// The aggregated block producers of the simulated network, seen as a single Poisson process.
///
/// The rate is expressed relative to the network limit: at rate `r`, a block whose target is `limit / d`
/// takes `d / r` target spacings on average. The same rate drives both proof types.
pub struct Miner {
    rng: ChaCha8Rng,
    hashrate: f64,
}

impl Miner {
    pub fn new(seed: u64, hashrate: f64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), hashrate }
    }

    pub fn hashrate(&self) -> f64 {
        self.hashrate
    }

    pub fn set_hashrate(&mut self, hashrate: f64) {
        self.hashrate = hashrate;
    }

    /// Seconds until a block is found against `target`, at least one
    pub fn solve_time(&mut self, params: &Params, target: Uint256, is_proof_of_stake: bool) -> SimResult<u64> {
        let difficulty = difficulty(params, target, is_proof_of_stake);
        let mean = params.target_spacing(is_proof_of_stake) as f64 * difficulty / self.hashrate;
        let distribution = Exp::new(1.0 / mean).map_err(|err| SimError::Distribution(err.to_string()))?;
        Ok((distribution.sample(&mut self.rng).round() as u64).max(1))
    }

    /// A hash drawn uniformly at or below `target`
    pub fn find_hash(&mut self, target: Uint256) -> BlockHash {
        let mut bytes = [0u8; 32];
        self.rng.fill_bytes(&mut bytes);
        BlockHash::from_uint256(Uint256::from_le_bytes(bytes) % (target + 1u64))
    }
}

/// How many times harder than the network limit `target` is
pub fn difficulty(params: &Params, target: Uint256, is_proof_of_stake: bool) -> f64 {
    params.active_limit(is_proof_of_stake).as_f64() / target.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapids_consensus_core::config::params::MAINNET_PARAMS;

    #[test]
    fn test_found_hashes_meet_the_target() {
        let mut miner = Miner::new(1, 1.0);
        let target = MAINNET_PARAMS.pow_limit >> 30;
        for _ in 0..100 {
            assert!(miner.find_hash(target).to_uint256() <= target);
        }
    }

    #[test]
    fn test_solve_times_follow_the_rate() {
        let params = MAINNET_PARAMS;
        let target = params.pos_limit / 100;
        assert!((difficulty(&params, target, true) - 100.0).abs() < 1e-6);

        let mut miner = Miner::new(2, 100.0);
        let mean = (0..2000).map(|_| miner.solve_time(&params, target, true).unwrap()).sum::<u64>() as f64 / 2000.0;
        assert!((mean - params.pos_target_spacing as f64).abs() < 2.0, "mean solve time {mean}");

        miner.set_hashrate(10.0);
        assert_eq!(miner.hashrate(), 10.0);
        let mean = (0..2000).map(|_| miner.solve_time(&params, target, true).unwrap()).sum::<u64>() as f64 / 2000.0;
        assert!(mean > 100.0, "mean solve time {mean}");
    }
}
