// Counter deltas -> per-second rates. Pure: no locking, no I/O.

use crate::models::{RateMetrics, RawCounterSnapshot};

/// Intervals at or below this are too short to produce a meaningful rate.
pub const MIN_ELAPSED_SECS: f64 = 0.1;

/// Monotonic seconds from `previous` to `current` (0 if `current` is not later).
pub fn elapsed_secs(previous: &RawCounterSnapshot, current: &RawCounterSnapshot) -> f64 {
    current
        .timestamp
        .saturating_duration_since(previous.timestamp)
        .as_secs_f64()
}

/// Turns two cumulative snapshots into rates.
///
/// Returns all-`None` when there is no baseline, when `elapsed_secs` is not above
/// [`MIN_ELAPSED_SECS`], or when any counter went backwards. A single decreasing counter
/// invalidates every rate for the cycle because they all share the same interval.
pub fn compute(
    previous: Option<&RawCounterSnapshot>,
    current: &RawCounterSnapshot,
    elapsed_secs: f64,
) -> RateMetrics {
    let Some(previous) = previous else {
        return RateMetrics::default();
    };
    if !elapsed_secs.is_finite() || elapsed_secs <= MIN_ELAPSED_SECS {
        return RateMetrics::default();
    }
    if current.went_backwards_from(previous) {
        return RateMetrics::default();
    }

    let per_sec = |cur: u64, prev: u64| Some((cur - prev) as f64 / elapsed_secs);
    RateMetrics {
        read_iops: per_sec(current.read_ops, previous.read_ops),
        write_iops: per_sec(current.write_ops, previous.write_ops),
        read_bytes_per_second: per_sec(current.read_bytes, previous.read_bytes),
        write_bytes_per_second: per_sec(current.write_bytes, previous.write_bytes),
    }
}
