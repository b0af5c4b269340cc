// Library exports for simlog-filter
// This allows the test suite and benches to import modules

pub mod cli;
pub mod command;
pub mod config;
pub mod display;
pub mod filter;
pub mod log;
pub mod operations;
pub mod session;
