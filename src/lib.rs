pub mod cli;
pub mod client;
pub mod error;
pub mod executor;
pub mod models;
pub mod report;
pub mod telemetry;
pub mod utils;
