use std::fs::File;
use std::io::{BufWriter, Write};

use serde::Serialize;

use rapids_consensus_core::{block::BlockRef, network::NetworkId};

use crate::{errors::SimResult, simulator::network::BlockSample};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRun {
    network: NetworkId,
    seed: u64,
    blocks: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonBlock<'a> {
    block: &'a BlockRef,
    algorithm: String,
    solve_time: u64,
    difficulty: f64,
    hashrate: f64,
}

/// Writes the run description followed by one JSON line per generated block
pub(crate) fn write_blocks_json(file_path: &str, network: NetworkId, seed: u64, samples: &[BlockSample]) -> SimResult<()> {
    let mut writer = BufWriter::new(File::create(file_path)?);
    write_json_line(&JsonRun { network, seed, blocks: samples.len() }, &mut writer)?;
    for sample in samples {
        let block = JsonBlock {
            block: &sample.block,
            algorithm: sample.algorithm.to_string(),
            solve_time: sample.solve_time,
            difficulty: sample.difficulty,
            hashrate: sample.hashrate,
        };
        write_json_line(&block, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json_line<T: Serialize, W: Write>(value: &T, writer: &mut W) -> SimResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}
