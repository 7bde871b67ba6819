use clap::Parser;

use crate::error::RunError;
use crate::models::run_config::RunConfig;

#[derive(Debug, Parser)]
#[command(
    name = "loadforge-burst",
    version,
    about = "Fire a burst of concurrent GET requests and report latency"
)]
pub struct Cli {
    /// Endpoint to hit, expected to answer with a JSON array
    #[arg(short, long, env = "BURST_TARGET")]
    pub target: Option<String>,

    /// Total number of requests to send
    #[arg(short = 'n', long, env = "BURST_REQUESTS")]
    pub requests: Option<u64>,

    /// Maximum number of requests in flight at once
    #[arg(short, long, env = "BURST_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Per-request timeout in milliseconds, 0 to disable
    #[arg(long, env = "BURST_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// JSON file with any of: target, total_requests, concurrency, timeout_ms, quiet
    #[arg(long, env = "BURST_CONFIG")]
    pub config: Option<String>,

    /// Only print the summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the summary as JSON; implies --quiet so stdout stays parseable
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Flags and environment win over the config file, which wins over
    /// built-in defaults.
    pub fn into_config(self) -> Result<RunConfig, RunError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(requests) = self.requests {
            config.total_requests = requests;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if self.timeout_ms.is_some() {
            config.timeout_ms = self.timeout_ms;
        }
        config.quiet |= self.quiet || self.json;

        Ok(config)
    }
}
