extern crate self as rapids_core;

pub mod log;
