use std::collections::BTreeMap;

use crate::models::metrics::RunSummary;
use crate::models::outcome::RequestOutcome;

/// Reduces a finished run to its summary.
///
/// Input order does not matter: durations are sorted before they are
/// summed, so the floating point result is the same for any permutation.
pub fn summarize(outcomes: &[RequestOutcome], total_wall_time: f64) -> RunSummary {
    let mut durations = Vec::with_capacity(outcomes.len());
    let mut failure_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut failed = 0u64;

    for outcome in outcomes {
        if outcome.is_success() {
            durations.push(outcome.duration().unwrap_or(0.0));
        } else {
            failed += 1;
            let key = outcome
                .error()
                .map(|e| e.kind())
                .unwrap_or_else(|| "UNKNOWN".to_string());
            *failure_counts.entry(key).or_insert(0) += 1;
        }
    }

    durations.sort_by(|a, b| a.total_cmp(b));

    let succeeded = durations.len() as u64;
    let total_requests = outcomes.len() as u64;
    let average_success_latency = if durations.is_empty() {
        None
    } else {
        Some(durations.iter().sum::<f64>() / durations.len() as f64)
    };
    let throughput = if total_wall_time > 0.0 {
        total_requests as f64 / total_wall_time
    } else {
        0.0
    };

    RunSummary {
        total_requests,
        succeeded,
        failed,
        total_wall_time,
        average_success_latency,
        fastest_response: durations.first().copied(),
        slowest_response: durations.last().copied(),
        median_response_time: calculate_median(&durations),
        throughput,
        failure_counts,
    }
}

/// Median of an already sorted slice.
pub fn calculate_median(sorted: &[f64]) -> Option<f64> {
    let len = sorted.len();
    if len == 0 {
        return None;
    }
    if len % 2 == 0 {
        Some((sorted[len / 2 - 1] + sorted[len / 2]) / 2.0)
    } else {
        Some(sorted[len / 2])
    }
}
