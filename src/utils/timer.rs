//! Monotonic timing helpers. `Instant` never goes backwards, so clock
//! adjustments on the host cannot skew measured latencies.

use std::time::Instant;

pub fn start() -> Instant {
    Instant::now()
}

/// Seconds elapsed since `since`.
pub fn elapsed(since: Instant) -> f64 {
    since.elapsed().as_secs_f64()
}
