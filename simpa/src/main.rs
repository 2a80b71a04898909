use clap::Parser;
use errors::{SimError, SimResult};
use itertools::Itertools;
use rapids_consensus::consensus::ConsensusRules;
use rapids_consensus_core::{
    config::{
        ConfigBuilder,
        params::{OverrideParams, Params},
    },
    network::NetworkId,
};
use rapids_core::{error, info};
use simulator::{
    miner::Miner,
    network::{BlockSample, HashrateJump, RapidsNetworkSimulator},
};
use std::{sync::Arc, time::Instant};

mod blocks_json;
pub mod errors;
pub mod simulator;

/// Rapids difficulty simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Network whose consensus parameters are simulated
    #[arg(short, long, default_value = "regtest")]
    network: NetworkId,

    /// Number of blocks generated on top of genesis
    #[arg(short, long, default_value_t = 1000)]
    blocks: u64,

    /// Seed of the solve time and block hash generator
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Block production rate, as a multiple of the rate which finds a block at the network limit in one target spacing
    #[arg(long, default_value_t = 1000.0)]
    hashrate: f64,

    /// Height at which the hashrate gets multiplied by the jump factor
    #[arg(long)]
    jump_height: Option<u64>,

    /// Hashrate multiplier applied at the jump height
    #[arg(long, default_value_t = 4.0)]
    jump_factor: f64,

    /// Number of blocks summarized by each line of the difficulty trajectory
    #[arg(short, long, default_value_t = 50)]
    report_interval: usize,

    /// JSON file with parameter overrides (regtest only)
    #[arg(long)]
    override_params_file: Option<String>,

    /// Writes the generated blocks to this file, one JSON object per line
    #[arg(long)]
    output_json: Option<String>,

    /// Logging level for all subsystems {off, error, warn, info, debug, trace}, or `module=level` filters
    #[arg(short = 'd', long = "loglevel", default_value = "info")]
    log_level: String,

    /// Avoid printing the difficulty trajectory
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = rapids_core::log::init_logger(None, &args.log_level) {
        eprintln!("Failed to initialize the logger: {err}");
        std::process::exit(1);
    }
    if let Err(err) = run(args) {
        error!("Simulation failed: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> SimResult<()> {
    if !(args.hashrate > 0.0 && args.jump_factor > 0.0) {
        return Err(SimError::InvalidArgument("hashrate and jump factor must be positive".to_string()));
    }
    if args.report_interval == 0 {
        return Err(SimError::InvalidArgument("report interval must be positive".to_string()));
    }

    let mut builder = ConfigBuilder::new(Params::from(args.network));
    if let Some(path) = &args.override_params_file {
        let overrides = OverrideParams::from_json(&std::fs::read_to_string(path)?)?;
        builder = builder.apply_overrides(overrides);
    }
    let rules = ConsensusRules::new(Arc::new(builder.build()?))?;
    let schedule = rules.difficulty_manager().schedule().ranges().iter().map(|(height, algorithm)| format!("{algorithm} from {height}")).join(", ");
    info!("Simulating {} blocks on {}, retarget schedule: {}", args.blocks, args.network, schedule);

    let hashrate_jump = args.jump_height.map(|height| HashrateJump { height, factor: args.jump_factor });
    let mut sim = RapidsNetworkSimulator::new(rules, Miner::new(args.seed, args.hashrate), hashrate_jump)?;
    let start = Instant::now();
    sim.run(args.blocks)?;
    let samples = sim.samples();
    info!("Generated and validated {} blocks in {:?}", samples.len(), start.elapsed());

    if !args.quiet {
        print_trajectory(samples, args.report_interval);
    }
    print_stats(samples);
    println!("[Chain work] {:#x}", sim.chain().chain_work());

    if let Some(path) = &args.output_json {
        blocks_json::write_blocks_json(path, args.network, args.seed, samples)?;
        info!("Blocks written to {}", path);
    }
    Ok(())
}

fn mean<'a>(samples: impl Iterator<Item = &'a BlockSample> + Clone, f: impl Fn(&BlockSample) -> f64) -> f64 {
    let count = samples.clone().count();
    if count == 0 {
        return 0.0;
    }
    samples.map(f).sum::<f64>() / count as f64
}

fn print_trajectory(samples: &[BlockSample], interval: usize) {
    println!("{:>8} {:>8} {:>10} {:>10} {:>12} {:>14}", "from", "to", "algorithm", "bits", "solve time", "difficulty");
    for chunk in samples.chunks(interval) {
        let (Some(first), Some(last)) = (chunk.first(), chunk.last()) else {
            continue;
        };
        println!(
            "{:>8} {:>8} {:>10} {:>#10x} {:>12.2} {:>14.2}",
            first.block.height,
            last.block.height,
            last.algorithm.to_string(),
            last.block.bits,
            mean(chunk.iter(), |sample| sample.solve_time as f64),
            mean(chunk.iter(), |sample| sample.difficulty),
        );
    }
}

fn print_stats(samples: &[BlockSample]) {
    for (algorithm, era) in &samples.iter().chunk_by(|sample| sample.algorithm) {
        let era = era.collect_vec();
        let (Some(first), Some(last)) = (era.first(), era.last()) else {
            continue;
        };
        println!(
            "[{} blocks {}..={}] solve time: {:.2}, difficulty: {:.2}",
            algorithm,
            first.block.height,
            last.block.height,
            mean(era.iter().copied(), |sample| sample.solve_time as f64),
            mean(era.iter().copied(), |sample| sample.difficulty),
        );
    }
}
