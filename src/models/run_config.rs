use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RunError;

pub const DEFAULT_TARGET: &str = "http://localhost:8000/users/";
pub const DEFAULT_TOTAL_REQUESTS: u64 = 10_000;
pub const DEFAULT_CONCURRENCY: usize = 256;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Everything a single burst needs. Can be loaded from a JSON file; any
/// field left out falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub target: String,
    pub total_requests: u64,
    pub concurrency: usize,

    /// Per-request deadline in milliseconds. `0` disables it.
    pub timeout_ms: Option<u64>,

    pub quiet: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            total_requests: DEFAULT_TOTAL_REQUESTS,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: None,
            quiet: false,
        }
    }
}

impl RunConfig {
    pub fn from_json_file(path: &str) -> Result<Self, RunError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RunError::ConfigFile {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| RunError::ConfigParse {
            path: path.to_string(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn validate(&self) -> Result<(), RunError> {
        if self.concurrency == 0 {
            return Err(RunError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
