pub mod aggregator;
pub mod config;
pub mod error;
pub mod exceedance;
pub mod histogram;
pub mod input;
pub mod report;
pub mod simulator;
pub mod stats;
pub mod types;
