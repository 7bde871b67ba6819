use std::time::Duration;

use hyper::StatusCode;
use thiserror::Error;

/// Why a single request did not produce a usable response.
///
/// These never escape a worker: they are folded into a failed
/// [`RequestOutcome`](crate::models::outcome::RequestOutcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("{0}")]
    Transport(String),

    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("invalid JSON array body: {0}")]
    Parse(String),

    #[error("worker task failed: {0}")]
    Aborted(String),
}

impl RequestError {
    /// Key used to group failures in the summary breakdown.
    pub fn kind(&self) -> String {
        match self {
            RequestError::Transport(_) => "TRANSPORT".to_string(),
            RequestError::Timeout(_) => "TIMEOUT".to_string(),
            RequestError::Status(status) => format!("HTTP {}", status.as_u16()),
            RequestError::Parse(_) => "PARSE".to_string(),
            RequestError::Aborted(_) => "ABORTED".to_string(),
        }
    }

    pub(crate) fn from_hyper(err: &hyper::Error) -> Self {
        let msg = if err.is_connect() {
            "Connection refused or host unreachable"
        } else if err.is_timeout() {
            "Timeout"
        } else if err.is_closed() || err.is_incomplete_message() {
            "Connection closed unexpectedly"
        } else {
            "Network error"
        };
        RequestError::Transport(format!("{}: {}", msg, err))
    }
}

/// Errors that stop a run before (or instead of) dispatching.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid target URL `{target}`: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot resolve target host `{host}`: {reason}")]
    Unresolvable { host: String, reason: String },

    #[error("cannot read config file {path}: {source}")]
    ConfigFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
