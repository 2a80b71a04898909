use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use rand_distr::{Distribution, Exp};
use rapids_consensus::{model::chain::MemoryChain, processes::difficulty::DifficultyManager, test_helpers::{block_hash_at, chain_from_solve_times}};
use rapids_consensus_core::{ancestry::ChainAncestry, block::BlockRef, config::params::MAINNET_PARAMS};

const CHAIN_LEN: u64 = 1000;
const BITS: u32 = 0x1d337f98;

/// A chain of alternating proof types with exponentially distributed solve times around the target spacing
fn random_chain(rng: &mut ChaCha8Rng) -> MemoryChain {
    let solve_times = Exp::new(1.0 / MAINNET_PARAMS.pos_target_spacing as f64).unwrap();
    let blocks: Vec<_> = (1..CHAIN_LEN).map(|height| (solve_times.sample(rng).ceil() as u64, BITS, height % 2 == 0)).collect();
    chain_from_solve_times(MAINNET_PARAMS.genesis.timestamp, BITS, blocks)
}

fn bench_retarget(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let chain = random_chain(&mut rng);
    let manager = DifficultyManager::new(&MAINNET_PARAMS).unwrap();
    let tip = *chain.tip().unwrap();
    // Any block below the windowed retarget activation goes through the legacy rule
    let legacy_tip = chain.ancestor_at(&tip, 150).unwrap();

    let mut group = c.benchmark_group("difficulty");
    group.bench_function("legacy", |b| {
        b.iter(|| black_box(manager.calc_legacy_bits(&chain, black_box(&legacy_tip), true)));
    });
    group.bench_function("lwma", |b| {
        b.iter(|| black_box(manager.calc_lwma_bits(&chain, black_box(&tip), true, false)));
    });
    group.bench_function("lwma with jump rule", |b| {
        b.iter(|| black_box(manager.calc_lwma_bits(&chain, black_box(&tip), true, true)));
    });
    group.bench_function("next required bits", |b| {
        b.iter(|| black_box(manager.next_required_bits(&chain, Some(black_box(&tip)), false)));
    });
    group.finish();
}

fn bench_chain_extension(c: &mut Criterion) {
    let manager = DifficultyManager::new(&MAINNET_PARAMS).unwrap();
    c.bench_function("extend chain by 500 blocks", |b| {
        b.iter(|| {
            let mut chain = MemoryChain::with_genesis(MAINNET_PARAMS.genesis.block_ref());
            for _ in 0..500 {
                let tip: BlockRef = *chain.tip().unwrap();
                let is_proof_of_stake = tip.height % 2 == 1;
                let bits = manager.next_required_bits(&chain, Some(&tip), is_proof_of_stake).unwrap();
                chain.push(block_hash_at(tip.height + 1), tip.timestamp + 15, bits, is_proof_of_stake);
            }
            black_box(chain.chain_work())
        });
    });
}

criterion_group!(benches, bench_retarget, bench_chain_extension);
criterion_main!(benches);
