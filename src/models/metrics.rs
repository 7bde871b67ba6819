use std::collections::BTreeMap;

use serde::Serialize;

/// Aggregate view of one run. Latencies are in seconds and only cover
/// successful requests; they are `None` when nothing succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_requests: u64,
    pub succeeded: u64,
    pub failed: u64,

    pub total_wall_time: f64,
    pub average_success_latency: Option<f64>,

    pub fastest_response: Option<f64>,
    pub slowest_response: Option<f64>,
    pub median_response_time: Option<f64>,

    pub throughput: f64,

    pub failure_counts: BTreeMap<String, u64>,
}

impl RunSummary {
    pub fn all_failed(&self) -> bool {
        self.total_requests > 0 && self.succeeded == 0
    }
}
