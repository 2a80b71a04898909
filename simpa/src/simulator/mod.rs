pub mod miner;
pub mod network;
