use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand_chacha::{
    rand_core::{RngCore, SeedableRng},
    ChaCha8Rng,
};
use rapids_math::{CompactTarget, Uint256, Uint320};

const ITERS: usize = 64 * 1024;

fn random_targets(rng: &mut ChaCha8Rng) -> Vec<Uint256> {
    let mut bytes = [0u8; 32];
    (0..ITERS)
        .map(|_| {
            rng.fill_bytes(&mut bytes);
            // Keep targets in a realistic range, well below the proof of work ceiling
            Uint256::from_le_bytes(bytes) >> (2 + rng.next_u32() % 64)
        })
        .collect()
}

fn bench_compact(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::from_seed([1; 32]);
    let targets = random_targets(&mut rng);
    let bits: Vec<_> = targets.iter().map(|&t| CompactTarget::from_target(t)).collect();

    let mut group = c.benchmark_group("compact");
    group.bench_function("encode", |b| {
        b.iter(|| {
            for &t in &targets {
                black_box(CompactTarget::from_target(t));
            }
        });
    });
    group.bench_function("decode", |b| {
        b.iter(|| {
            for &compact in &bits {
                black_box(compact.decode());
            }
        });
    });
    group.finish();
}

fn bench_work(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::from_seed([2; 32]);
    let targets = random_targets(&mut rng);
    let factors: Vec<_> = (0..ITERS).map(|_| rng.next_u64() % 100_000 + 1).collect();

    let mut group = c.benchmark_group("uint256");
    group.bench_function("block work", |b| {
        b.iter(|| {
            for &t in &targets {
                black_box((!t / (t + 1u64)) + 1u64);
            }
        });
    });
    group.bench_function("widened mul div", |b| {
        b.iter(|| {
            for (&t, &f) in targets.iter().zip(factors.iter()) {
                black_box(((Uint320::from(t) * f) / (f + 7)).clamp_to(Uint256::MAX >> 2));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_compact, bench_work);
criterion_main!(benches);
