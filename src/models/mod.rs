pub mod metrics;
pub mod outcome;
pub mod run_config;
