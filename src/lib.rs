pub mod bench;
pub mod config;
pub mod display;
pub mod errors;
pub mod extract;
pub mod grid;
pub mod metrics;
pub mod report;
pub mod results;
pub mod runner;
pub mod types;
