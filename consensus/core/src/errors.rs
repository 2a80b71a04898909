pub mod config;
pub mod difficulty;
pub mod pow;
